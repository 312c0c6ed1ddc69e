use sqldb_table::persistence::{
    AppendOptions, AppendSummary, ColumnType, DEFAULT_BATCH_SIZE, Key, KeyValue, MemoryTable,
    Table, TableError, TransactionStats, UnsupportedValuePolicy, Value,
};

use super::{FailingCommitTable, PlainTable, _collect, _numbers_table};

fn _counter_table(rows: usize) -> MemoryTable {
    let mut table = MemoryTable::with_key_type(vec![ColumnType::Integer]);
    table.add_integer_column("n", true, false);
    for id in 0..rows as i64 {
        let mut cursor = table.insert(&Key::from(id)).unwrap();
        cursor.bind(Value::Integer(id), true).unwrap();
        cursor.execute().unwrap();
    }
    table
}

fn _mixed_table() -> MemoryTable {
    let mut table =
        MemoryTable::with_key_type(vec![ColumnType::TextKey, ColumnType::Integer]);
    table.add_integer_column("count", false, true);
    table.add_double_column("ratio", true, false, Some(3));
    table.add_var_char_column("label", true, false);
    table.add_date_column("day");
    table.add_bool_column("ok", true, false);

    let rows = [
        ("a", 1, 5, Some(0.5), Some("first"), 10, true),
        ("a", 2, 6, None, Some("second"), 20, false),
        ("b", 1, 7, Some(1.25), None, 30, true),
    ];
    for (text, number, count, ratio, label, day, ok) in rows {
        let key = Key::new(vec![KeyValue::Text(text.to_string()), KeyValue::Integer(number)]);
        let mut cursor = table.insert(&key).unwrap();
        cursor.bind(Value::Integer(count), true).unwrap();
        cursor
            .bind(Value::Double(ratio.unwrap_or_default()), ratio.is_some())
            .unwrap();
        cursor
            .bind(Value::from(label.unwrap_or_default()), label.is_some())
            .unwrap();
        cursor.bind(Value::Integer(day), true).unwrap();
        cursor.bind(Value::from(ok), true).unwrap();
        cursor.execute().unwrap();
    }
    table
}

#[test]
fn append_into_empty_table_copies_rows_in_order() {
    let source = _numbers_table(&[(1, 10), (2, 20), (3, 30)]);
    let mut target = MemoryTable::new();

    let summary = target.append(&source).unwrap();

    assert_eq!(summary.rows, 3);
    assert_eq!(target.key_type(), &[ColumnType::Integer]);
    let rows: Vec<(Key, i64)> = _collect(&target)
        .into_iter()
        .map(|(key, fields)| (key, fields[0].as_deref().unwrap().parse().unwrap()))
        .collect();
    assert_eq!(
        rows,
        vec![(Key::from(1), 10), (Key::from(2), 20), (Key::from(3), 30)]
    );
}

#[test]
fn append_adopts_the_whole_schema() {
    let source = _mixed_table();
    let mut target = MemoryTable::new();

    target.append(&source).unwrap();

    assert_eq!(target.schema(), source.schema());
    assert_eq!(target.key_type(), source.key_type());
    assert_eq!(target.column_decimals(1), 3);
    assert!(!target.is_column_nullable(0, 0));
    assert!(target.is_column_unique(0, 0));
}

#[test]
fn append_round_trips_values_and_nulls() {
    let source = _mixed_table();
    let mut target = MemoryTable::new();

    target.append(&source).unwrap();

    assert_eq!(_collect(&target), _collect(&source));
    assert_eq!(target.scan(), source.scan());

    let cursor = target
        .seek(&Key::new(vec![KeyValue::Text("a".into()), KeyValue::Integer(2)]))
        .unwrap()
        .unwrap();
    assert!(cursor.is_null(1));
    assert_eq!(cursor.get_text(2), "second");
    assert_eq!(cursor.get_text(4), "false");
}

#[test]
fn append_into_a_populated_table_keeps_its_schema() {
    let source = _numbers_table(&[(3, 30)]);
    let mut target = _numbers_table(&[(1, 10)]);
    target.add_text_column("extra");

    target.append(&source).unwrap();

    assert_eq!(target.num_fields(0), 2);
    assert_eq!(target.rows(), 2);
    assert_eq!(target.dump_row(&Key::from(3)).unwrap(), "30;");
}

#[test]
fn empty_source_is_a_no_op() {
    let source = _numbers_table(&[]);
    let mut target = MemoryTable::new();

    let summary = target.append(&source).unwrap();

    assert_eq!(summary, AppendSummary::default());
    assert_eq!(target.num_fields(0), 1);
    assert_eq!(target.transaction_stats(), TransactionStats::default());
}

#[test]
fn batches_commit_every_4096_rows() {
    let source = _counter_table(DEFAULT_BATCH_SIZE * 2 + 5);
    let mut target = MemoryTable::new();

    let summary = target.append(&source).unwrap();

    assert_eq!(summary.rows, DEFAULT_BATCH_SIZE * 2 + 5);
    assert_eq!(summary.batches, 3);
    assert_eq!(
        target.transaction_stats(),
        TransactionStats {
            begins: 3,
            commits: 3,
            rollbacks: 0
        }
    );
    assert!(!target.in_transaction());
}

#[test]
fn an_exact_batch_commits_once() {
    let source = _counter_table(DEFAULT_BATCH_SIZE);
    let mut target = MemoryTable::new();

    target.append(&source).unwrap();

    let stats = target.transaction_stats();
    assert_eq!((stats.begins, stats.commits), (1, 1));
    assert_eq!(target.rows(), DEFAULT_BATCH_SIZE);
}

#[test]
fn batch_size_is_configurable() {
    let source = _counter_table(7);
    let mut target = MemoryTable::new();
    let options = AppendOptions {
        batch_size: 3,
        ..AppendOptions::default()
    };

    let summary = target.append_with(&source, &options).unwrap();

    assert_eq!(summary.batches, 3);
    assert_eq!(target.transaction_stats().commits, 3);
    assert_eq!(target.transaction_stats().begins, 3);
}

#[test]
fn zero_batch_size_is_refused() {
    let source = _counter_table(1);
    let mut target = MemoryTable::new();
    let options = AppendOptions {
        batch_size: 0,
        ..AppendOptions::default()
    };

    assert!(matches!(
        target.append_with(&source, &options),
        Err(TableError::InvalidConfig(_))
    ));
    assert_eq!(target.num_fields(0), 0);
}

#[test]
fn blob_columns_arrive_as_nulls() {
    let mut source = _numbers_table(&[]);
    source.add_blob_column("payload");
    source.add_vector_column("embedding");
    {
        let mut cursor = source.insert(&Key::from(1)).unwrap();
        cursor.bind(Value::Integer(10), true).unwrap();
        cursor.bind(Value::Blob(vec![1, 2, 3]), true).unwrap();
        cursor.bind(Value::Blob(vec![4, 5]), true).unwrap();
        cursor.execute().unwrap();
    }
    let mut target = MemoryTable::new();

    let summary = target.append(&source).unwrap();

    assert_eq!(summary.nulled_columns, vec!["payload", "embedding"]);
    let cursor = target.seek(&Key::from(1)).unwrap().unwrap();
    assert_eq!(cursor.get_integer(0), 10);
    assert!(cursor.is_null(1));
    assert!(cursor.is_null(2));
}

#[test]
fn blob_columns_can_be_rejected() {
    let mut source = _numbers_table(&[(1, 10)]);
    source.add_blob_column("payload");
    let mut target = MemoryTable::new();
    let options = AppendOptions {
        unsupported: UnsupportedValuePolicy::Reject,
        ..AppendOptions::default()
    };

    let result = target.append_with(&source, &options);

    assert_eq!(
        result,
        Err(TableError::UnsupportedTransfer {
            column: "payload".to_string(),
            column_type: ColumnType::Blob,
        })
    );
    assert_eq!(target.num_fields(0), 0);
    assert_eq!(target.rows(), 0);
}

#[test]
fn failure_rolls_back_the_open_batch() {
    let source = _numbers_table(&[(1, 10), (2, 20), (3, 30), (4, 40)]);
    let mut target = _numbers_table(&[(3, 0)]);
    let options = AppendOptions {
        batch_size: 2,
        ..AppendOptions::default()
    };

    let result = target.append_with(&source, &options);

    assert_eq!(result, Err(TableError::DuplicateKey(Key::from(3))));
    let keys: Vec<Key> = _collect(&target).into_iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec![Key::from(3), Key::from(1), Key::from(2)]);
    assert_eq!(
        target.transaction_stats(),
        TransactionStats {
            begins: 2,
            commits: 1,
            rollbacks: 1
        }
    );
}

#[test]
fn appending_merges_the_source_log() {
    let source = _numbers_table(&[(1, 10), (2, 20)]);
    let mut target = MemoryTable::new();

    target.append(&source).unwrap();

    let target_log = target.log().read();
    // two inserts of our own followed by the source's two
    assert_eq!(target_log.len(), 4);
    assert_eq!(&target_log.records()[2..], source.log().read().records());
}

#[test]
fn appending_a_copy_does_not_duplicate_a_shared_log() {
    let source = _numbers_table(&[(1, 10)]);
    let mut copy = source.copy();
    copy.clear();

    copy.append(&source).unwrap();

    // insert, clear, insert again; the log itself is not merged twice
    assert_eq!(source.log().read().len(), 3);
    assert!(copy.log().ptr_eq(source.log()));
}

#[test]
fn batching_works_with_no_op_transactions() {
    let source = _numbers_table(&[(1, 10), (2, 20), (3, 30), (4, 40), (5, 50)]);
    let mut target = PlainTable {
        inner: MemoryTable::new(),
    };
    let options = AppendOptions {
        batch_size: 2,
        ..AppendOptions::default()
    };

    let summary = target.append_with(&source, &options).unwrap();

    assert_eq!((summary.rows, summary.batches), (5, 3));
    assert_eq!(_collect(&target), _collect(&source));
    assert_eq!(target.inner.transaction_stats(), TransactionStats::default());
}

#[test]
fn a_failed_commit_rolls_back_the_batch() {
    let source = _numbers_table(&[(1, 10), (2, 20), (3, 30)]);
    let mut target = FailingCommitTable {
        inner: MemoryTable::new(),
    };
    let options = AppendOptions {
        batch_size: 2,
        ..AppendOptions::default()
    };

    let result = target.append_with(&source, &options);

    assert_eq!(result, Err(TableError::Backend("commit refused".to_string())));
    assert!(!target.inner.in_transaction());
    assert_eq!(target.inner.rows(), 0);
    assert_eq!(
        target.inner.transaction_stats(),
        TransactionStats {
            begins: 1,
            commits: 0,
            rollbacks: 1
        }
    );
    assert!(target.log().read().is_empty());
}

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use pgclause::{
    Accumulator, CompoundClause, Destination, FilterClause, MemoryDriver, NullInt64, NullString,
    NullTime, Postgres, QueryError, ResultAccumulator, Schema, SchemaError, Slot, SortDirection,
    Sqlite, Table, TableModel, Value, ValueKind,
};

#[derive(Debug, Clone, TableModel)]
struct Example {
    #[column(psql = "cool", sqlite = "cool")]
    name: String,
    #[column(psql = "created_time", sqlite = "created_time")]
    created: DateTime<Utc>,
    #[column(psql = "number_of_food")]
    food: i32,
    #[column(psql = "number_of_star")]
    stars: Option<i64>,
    #[column(psql = "radius_of_moon")]
    radius: f64,
    #[column(psql = "is_true_true")]
    is_true: bool,
    #[column(psql = "loves")]
    loves: Vec<String>,
}

#[derive(TableModel)]
struct Untagged {
    #[column(psql = "id")]
    id: i64,
    note: String,
}

/// Receivers for `Example`, one slot per field.
#[derive(Clone)]
struct ExampleSlots {
    name: Slot<String>,
    created: NullTime,
    stars: NullInt64,
}

impl ExampleSlots {
    fn new() -> Self {
        Self {
            name: Slot::default(),
            created: NullTime::new(Slot::new(DateTime::<Utc>::UNIX_EPOCH)),
            stars: NullInt64::new(Slot::default()),
        }
    }

    fn accumulator(&self) -> impl Accumulator<Output = (String, Option<DateTime<Utc>>, Option<i64>)> {
        let slots = self.clone();
        ResultAccumulator::new(
            [
                ("cool", Destination::from(&self.name)),
                ("created_time", self.created.clone().into()),
                ("number_of_star", self.stars.clone().into()),
            ],
            move || {
                (
                    slots.name.get(),
                    slots.created.is_valid().then(|| slots.created.target().get()),
                    slots.stars.is_valid().then(|| slots.stars.target().get()),
                )
            },
        )
    }
}

fn example_table() -> Table {
    Table::for_model::<Example>("exampleTable", Postgres).unwrap()
}

#[test]
fn derived_model_exposes_field_descriptors() {
    let fields = Example::FIELDS;
    assert_eq!(fields.len(), 7);
    assert_eq!(fields[0].field, "name");
    assert_eq!(fields[0].column_for("psql"), Some("cool"));
    assert_eq!(fields[3].kind, ValueKind::Int64);
    assert_eq!(fields[6].kind, ValueKind::TextArray);
    assert_eq!(fields[2].column_for("sqlite"), None);
}

#[test]
fn untagged_fields_are_rejected() {
    let err = Table::postgres::<Untagged>("notes").unwrap_err();
    let SchemaError::MissingTag { field, tag } = err else {
        panic!("unexpected error: {err}");
    };
    assert!(field.ends_with("Untagged::note"));
    assert_eq!(tag, "psql");
}

#[test]
fn select_lists_bound_columns_in_name_order() {
    let name = Slot::new(String::new());
    let created = Slot::new(DateTime::<Utc>::UNIX_EPOCH);

    let mut table = example_table();
    table
        .set_column_receiver("created_time", &created)
        .unwrap()
        .set_column_receiver("cool", &name)
        .unwrap();

    let query = table
        .build(ResultAccumulator::new(Vec::<(String, Destination)>::new(), || ()))
        .unwrap();
    assert_eq!(query.sql(), "SELECT cool, created_time FROM exampleTable");
    assert!(query.scan_targets()[0].is_bound_to(&name));
    assert!(query.scan_targets()[1].is_bound_to(&created));
}

#[test]
fn nested_filters_with_shared_values() {
    let slots = ExampleSlots::new();
    let acc = slots.accumulator();

    let mut table = example_table();
    table.load_receivers_from_accumulator(&acc).unwrap();

    table.assert_column_exists("number_of_star").unwrap();
    table
        .assert_filter_clause_valid("number_of_star", &Value::Int64(10))
        .unwrap();
    table
        .column_equals("cool", "Dovahkiin")
        .unwrap()
        .add_filter_clause(
            CompoundClause::or()
                .add_clause(FilterClause::primitive("number_of_star", ">", "", 10i64))
                .add_clause(FilterClause::primitive("number_of_star", "<", "-?", 10i64))
                .add_clause(FilterClause::null_check("number_of_star", false)),
        )
        .add_order_by_clause("number_of_star", SortDirection::Descending)
        .unwrap()
        .limit(25, 5);

    let query = table.build(acc).unwrap();
    assert_eq!(
        query.sql(),
        "SELECT cool, created_time, number_of_star FROM exampleTable \
         WHERE (cool = $1 AND (number_of_star > $2 OR number_of_star < -$2 OR number_of_star IS NULL)) \
         ORDER BY number_of_star DESC LIMIT 25 OFFSET 5"
    );
    assert_eq!(query.params(), &[Value::from("Dovahkiin"), Value::Int64(10)]);
}

#[test]
fn sqlite_dialect_numbers_with_question_marks() {
    let schema = Schema::from_json(
        r#"{"columns": [
            {"name": "cool", "kind": "text"},
            {"name": "number_of_star", "kind": "int64"}
        ]}"#,
    )
    .unwrap();

    let name = Slot::new(String::new());
    let mut table = Table::new("exampleTable", Sqlite, &schema);
    table
        .set_column_receiver("cool", &name)
        .unwrap()
        .column_compare("number_of_star", ">=", 3i64)
        .unwrap()
        .column_not_null("cool")
        .unwrap();

    let query = table
        .build(ResultAccumulator::new(Vec::<(String, Destination)>::new(), || ()))
        .unwrap();
    assert_eq!(
        query.sql(),
        "SELECT cool FROM exampleTable WHERE (number_of_star >= ?1 AND cool IS NOT NULL)"
    );
}

#[test]
fn batch_binding_reports_every_violation() {
    let name = Slot::new(0i32);
    let loves = Slot::new(Vec::<i64>::new());
    let acc = ResultAccumulator::new(
        [
            ("cool", Destination::from(&name)),
            ("loves", Destination::from(&loves)),
            ("is_true_true", Destination::from(Value::Bool(true))),
            ("surname", NullString::new(Slot::default()).into()),
        ],
        || (),
    );

    let mut table = example_table();
    let err = table.load_receivers_from_accumulator(&acc).unwrap_err();
    let message = err.to_string();

    assert_eq!(err.violations().len(), 4);
    assert!(message.contains("cool: invalid type for column 'cool': cannot assign integer to text"));
    assert!(message.contains("loves: invalid type for column 'loves': cannot assign bigint[] to text[]"));
    assert!(message.contains("is_true_true: receiver for column 'is_true_true' must be a writable receiver"));
    assert!(message.contains("surname: no column named surname found for table exampleTable"));
}

#[test]
fn typed_null_filters_must_match_the_column() {
    let mut table = example_table();
    table.column_equals("number_of_star", None::<i64>).unwrap();

    let err = table.column_equals("cool", None::<i64>).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid type for column 'cool': cannot assign NullInt64 to text"
    );
}

#[test]
fn built_query_round_trips_through_a_driver() {
    let slots = ExampleSlots::new();
    let acc = slots.accumulator();

    let mut table = example_table();
    table
        .load_receivers_from_accumulator(&acc)
        .unwrap()
        .column_compare("number_of_star", ">", 3i64)
        .unwrap();

    let created = Utc.timestamp_opt(1_320_969_600, 0).unwrap();
    let driver = MemoryDriver::new([
        vec![
            Some(Value::from("Dovahkiin")),
            Some(Value::Timestamp(created)),
            Some(Value::Int64(64)),
        ],
        vec![Some(Value::from("Lydia")), None, Some(Value::Null(ValueKind::Int64))],
    ]);

    let mut query = table.build(acc).unwrap();
    assert_eq!(query.run(&driver, &()).unwrap(), 2);
    assert_eq!(
        query.results(),
        &[
            ("Dovahkiin".to_string(), Some(created), Some(64)),
            ("Lydia".to_string(), None, None),
        ]
    );

    let (sql, params) = &driver.executed()[0];
    assert_eq!(
        sql,
        "SELECT cool, created_time, number_of_star FROM exampleTable WHERE number_of_star > $1"
    );
    assert_eq!(params, &vec![Value::Int64(3)]);
    assert_eq!(driver.released(), 1);
}

#[test]
fn null_into_plain_receiver_fails_the_scan() {
    let name = Slot::new(String::new());
    let acc = ResultAccumulator::new([("cool", &name)], {
        let name = name.clone();
        move || name.get()
    });

    let mut table = example_table();
    table.load_receivers_from_accumulator(&acc).unwrap();
    let mut query = table.build(acc).unwrap();

    let driver = MemoryDriver::new([vec![Some(Value::from("first"))], vec![None]]);
    let err = query.run(&driver, &()).unwrap_err();

    assert!(matches!(err, QueryError::Scan { row: 1, .. }));
    assert_eq!(
        err.to_string(),
        "failed to scan row 1: cannot scan NULL into non-nullable text receiver"
    );
    assert_eq!(query.results(), &["first".to_string()]);
    assert_eq!(driver.released(), 1);
}

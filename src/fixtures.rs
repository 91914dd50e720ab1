#[cfg(test)]
pub mod test {
    use crate::schema::{FieldDescriptor, Schema};
    use crate::value::{Kind, Record, Value};

    pub const HEADER: &str = "This is a test of inputdict\nThese are the inputs";

    pub fn sub_schema() -> Schema {
        Schema::new(vec![
            FieldDescriptor::required("name")
                .of(Kind::String)
                .default("mysubdict")
                .help("An arbitrary name"),
            FieldDescriptor::optional("mylist")
                .of(Kind::List)
                .default(vec![1, 2, 3, 5])
                .help("An arbitrary list"),
        ])
        .unwrap()
    }

    fn scalar_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::required("name")
                .of(Kind::String)
                .default("myname")
                .help("An arbitrary name"),
            FieldDescriptor::required("intval")
                .of(Kind::Integer)
                .default(0)
                .check(|v| (v.as_i64().is_some_and(|n| n >= 0), "intval must be >= 0."))
                .help("An arbitrary integer"),
            FieldDescriptor::optional("floatval")
                .one_of(&[Kind::Integer, Kind::Float])
                .default(0.123)
                .check_with_record(|v, record| {
                    let intval = record.get("intval").and_then(Value::as_f64).unwrap_or(0.0);
                    v.as_f64().is_some_and(|x| x + intval >= 200.0)
                })
                .help("An arbitrary float"),
            FieldDescriptor::optional("boolval")
                .of(Kind::Bool)
                .default(true)
                .help("An arbitrary boolean"),
        ]
    }

    /// name, intval, floatval, boolval and a required `subdict`.
    pub fn main_schema() -> Schema {
        let mut fields = scalar_fields();
        fields.push(
            FieldDescriptor::required("subdict")
                .nested(sub_schema())
                .help("A required subdictionary"),
        );
        Schema::new(fields).unwrap()
    }

    /// The scalar fields moved under a `default` section, for INI inputs.
    pub fn ini_schema() -> Schema {
        Schema::new(vec![
            FieldDescriptor::required("default")
                .nested(Schema::new(scalar_fields()).unwrap())
                .help("Default section"),
            FieldDescriptor::required("subdict")
                .nested(sub_schema())
                .help("A required subdictionary"),
        ])
        .unwrap()
    }

    /// A list of server entries, each validated against its own schema.
    pub fn server_schema() -> Schema {
        let server = Schema::new(vec![
            FieldDescriptor::required("host").of(Kind::String).default("localhost"),
            FieldDescriptor::optional("port")
                .of(Kind::Integer)
                .default(8080)
                .check(|v| (v.as_i64().is_some_and(|p| p > 0), "port must be positive")),
        ])
        .unwrap();
        Schema::new(vec![
            FieldDescriptor::optional("servers")
                .list_of(server)
                .default(vec![Value::Map([("host", "primary")].into_iter().collect())])
                .help("Upstream servers"),
        ])
        .unwrap()
    }

    /// The mapping from the reference scenario, including an undeclared key.
    pub fn scenario_input() -> Record {
        let subdict: Record = [("name", "subdictname")].into_iter().collect();
        let mut raw = Record::new();
        raw.insert("name", "junk");
        raw.insert("intval", 111);
        raw.insert("floatval", 100);
        raw.insert("subdict", subdict);
        raw.insert("extrakey", "blah");
        raw
    }

    #[test]
    fn fixtures_build() {
        assert_eq!(main_schema().len(), 5);
        assert_eq!(ini_schema().len(), 2);
        assert!(server_schema().get("servers").is_some());
    }
}

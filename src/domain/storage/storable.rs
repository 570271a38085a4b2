//! Capability for domain objects that can be flattened into records

use super::record::Record;

/// A domain object the storage layer can persist without knowing its type
///
/// Implementers decide which fields are persistable. `to_persistence` must
/// return exactly those fields; `from_persistence` assigns the declared fields
/// found in the record and ignores everything else. Declared fields missing
/// from the record keep whatever value the instance already had.
pub trait Storable {
    fn to_persistence(&self) -> Record;

    fn from_persistence(&mut self, record: &Record);
}

/// Records are trivially storable
impl Storable for Record {
    fn to_persistence(&self) -> Record {
        self.clone()
    }

    fn from_persistence(&mut self, record: &Record) {
        *self = record.clone();
    }
}

/// Storable equality: two objects are equal when their persisted forms are
pub fn storable_eq<A, B>(a: &A, b: &B) -> bool
where
    A: Storable + ?Sized,
    B: Storable + ?Sized,
{
    a.to_persistence() == b.to_persistence()
}

/// Builds a fresh `T` and populates it from `record`
pub fn hydrate<T>(record: &Record) -> T
where
    T: Storable + Default,
{
    let mut instance = T::default();
    instance.from_persistence(record);
    instance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::Value;
    use crate::record;

    #[derive(Debug, Default)]
    struct Item {
        ident: Option<String>,
        value: Option<String>,
        transient: Option<String>,
    }

    impl Item {
        fn new(ident: &str, value: &str) -> Self {
            Self {
                ident: Some(ident.to_string()),
                value: Some(value.to_string()),
                transient: None,
            }
        }
    }

    impl Storable for Item {
        fn to_persistence(&self) -> Record {
            record! {
                "ident" => self.ident.clone(),
                "value" => self.value.clone(),
            }
        }

        fn from_persistence(&mut self, record: &Record) {
            if let Some(ident) = record.get("ident") {
                self.ident = ident.as_str().map(str::to_string);
            }
            if let Some(value) = record.get("value") {
                self.value = value.as_str().map(str::to_string);
            }
        }
    }

    #[test]
    fn test_round_trip() {
        let control = Item::new("<Id>", "<Value>");
        let variable: Item = hydrate(&control.to_persistence());

        assert!(storable_eq(&control, &variable));
    }

    #[test]
    fn test_different_values_are_not_equal() {
        assert!(!storable_eq(
            &Item::new("<Id>", "<Value>"),
            &Item::new("<Id>", "<Other>")
        ));
    }

    #[test]
    fn test_missing_field_persists_as_null() {
        let item = Item {
            ident: Some("<Id>".to_string()),
            ..Default::default()
        };
        let persisted = item.to_persistence();

        assert!(persisted.contains_key("value"));
        assert_eq!(persisted.get("value"), Some(&Value::Null));
    }

    #[test]
    fn test_transient_fields_are_untouched() {
        let mut item = Item::new("<Id>", "<Value>");
        item.transient = Some("<Transient>".to_string());

        let persisted = item.to_persistence();
        item.from_persistence(&persisted);

        assert_eq!(item.transient.as_deref(), Some("<Transient>"));
        assert!(!persisted.contains_key("transient"));
    }

    #[test]
    fn test_transient_fields_do_not_affect_equality() {
        let mut a = Item::new("<Id>", "<Value>");
        a.transient = Some("one".to_string());
        let mut b = Item::new("<Id>", "<Value>");
        b.transient = Some("two".to_string());

        assert!(storable_eq(&a, &b));
    }

    #[test]
    fn test_undeclared_fields_are_ignored() {
        let record = record! { "ident" => "1", "value" => "one", "custom" => "<Custom>" };
        let item: Item = hydrate(&record);

        assert_eq!(item.ident.as_deref(), Some("1"));
        assert!(!item.to_persistence().contains_key("custom"));
    }

    #[test]
    fn test_absent_fields_keep_defaults() {
        let item: Item = hydrate(&record! { "ident" => "1" });
        assert_eq!(item.ident.as_deref(), Some("1"));
        assert!(item.value.is_none());
    }

    #[test]
    fn test_record_is_storable() {
        let record = record! { "one" => 1 };
        let copy: Record = hydrate(&record);
        assert!(storable_eq(&record, &copy));
    }
}

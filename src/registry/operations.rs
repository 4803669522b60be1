//! The three registry workflows

use chrono::{Local, Months, NaiveDate};

use crate::observability::Logger;
use crate::person::Person;
use crate::store::PersonStore;
use crate::validate::{
    age_in_years, is_valid_address, is_valid_date, is_valid_person_id, parse_date,
};

use super::errors::{RegistryError, RegistryResult};

/// Demerit-point threshold for drivers under 21, over a 12-month window.
const YOUNG_DRIVER_THRESHOLD: u32 = 6;
/// Demerit-point threshold for drivers 21 and over, over a 24-month window.
const ADULT_DRIVER_THRESHOLD: u32 = 12;
/// Age below which the young-driver regime applies.
const YOUNG_DRIVER_AGE: i32 = 21;
/// Age below which an address change is locked.
const ADULT_AGE: i32 = 18;

/// Registry over a flat-file person store.
///
/// "Today" is captured at construction and used for every age and
/// demerit-window computation made through this instance.
pub struct Registry {
    store: PersonStore,
    today: NaiveDate,
}

impl Registry {
    /// Creates a registry using the local calendar date as "today".
    pub fn new(store: PersonStore) -> Self {
        Self::with_reference_date(store, Local::now().date_naive())
    }

    /// Creates a registry with a fixed reference date. Used by tests and
    /// by callers that need reproducible age and window computations.
    pub fn with_reference_date(store: PersonStore, today: NaiveDate) -> Self {
        Self { store, today }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &PersonStore {
        &self.store
    }

    /// Creates a new person record.
    ///
    /// The candidate's id, address and birthdate must pass their format
    /// rules and the id must not already exist. On success exactly one
    /// line is appended to the backing file.
    ///
    /// # Errors
    ///
    /// `InvalidField` for a failing format rule, `DuplicateId` when the
    /// identifier exists, `Store` when the backing file cannot be used.
    /// Nothing is written on any failure.
    pub fn add_person(&self, candidate: Person) -> RegistryResult<()> {
        if !is_valid_person_id(&candidate.id) {
            return Err(RegistryError::invalid_field("person id", candidate.id.as_str()));
        }
        if !is_valid_address(&candidate.address) {
            return Err(RegistryError::invalid_field("address", candidate.address.as_str()));
        }
        if !is_valid_date(&candidate.birthdate) {
            return Err(RegistryError::invalid_field(
                "birthdate",
                candidate.birthdate.as_str(),
            ));
        }

        let loaded = self.store.load()?;
        if loaded.find(&candidate.id).is_some() {
            return Err(RegistryError::DuplicateId(candidate.id));
        }

        self.store.append(&candidate)?;
        Logger::info("PERSON_ADDED", &[("id", &candidate.id)]);
        Ok(())
    }

    /// Updates a person's identity fields.
    ///
    /// Locates the record by `original_id`, diffs the candidate against
    /// it and evaluates the policy gates in order:
    ///
    /// 1. a birthdate change must be the only change, and the new
    ///    birthdate must be a valid date
    /// 2. a person under 18 may not change address
    /// 3. when the first character of `original_id` is an even digit,
    ///    the identifier may not change
    /// 4. a changed identifier or address is re-validated; unchanged
    ///    fields are not
    ///
    /// On success all five identity fields are applied and the whole
    /// store is rewritten; suspension and demerit history are untouched.
    ///
    /// # Errors
    ///
    /// `NotFound` when `original_id` has no record, `InvalidField` when
    /// the stored birthdate cannot be parsed or a changed field fails
    /// validation, `PolicyViolation` for a failing gate, `Store` for
    /// backing-file failures. The file is not touched on failure.
    pub fn update_personal_details(
        &self,
        original_id: &str,
        candidate: &Person,
    ) -> RegistryResult<()> {
        let mut loaded = self.store.load()?;
        let target = loaded
            .find_mut(original_id)
            .ok_or_else(|| RegistryError::NotFound(original_id.to_string()))?;

        // Should not occur if create-time validation held, but a
        // malformed stored birthdate means age cannot be determined.
        let birth = parse_date(&target.birthdate)
            .ok_or_else(|| RegistryError::invalid_field("stored birthdate", target.birthdate.as_str()))?;
        let age = age_in_years(birth, self.today);

        let id_changed = candidate.id != target.id;
        let first_name_changed = candidate.first_name != target.first_name;
        let last_name_changed = candidate.last_name != target.last_name;
        let address_changed = candidate.address != target.address;
        let birthdate_changed = candidate.birthdate != target.birthdate;

        if birthdate_changed {
            if id_changed || first_name_changed || last_name_changed || address_changed {
                return Err(RegistryError::PolicyViolation(
                    "a birthdate change must not be combined with any other change",
                ));
            }
            if !is_valid_date(&candidate.birthdate) {
                return Err(RegistryError::invalid_field(
                    "birthdate",
                    candidate.birthdate.as_str(),
                ));
            }
        }

        if age < ADULT_AGE && address_changed {
            return Err(RegistryError::PolicyViolation(
                "a person under 18 may not change address",
            ));
        }

        if id_changed && has_even_leading_digit(original_id) {
            return Err(RegistryError::PolicyViolation(
                "identifier is locked when its first digit is even",
            ));
        }

        if id_changed && !is_valid_person_id(&candidate.id) {
            return Err(RegistryError::invalid_field("person id", candidate.id.as_str()));
        }
        if address_changed && !is_valid_address(&candidate.address) {
            return Err(RegistryError::invalid_field("address", candidate.address.as_str()));
        }

        target.id = candidate.id.clone();
        target.first_name = candidate.first_name.clone();
        target.last_name = candidate.last_name.clone();
        target.address = candidate.address.clone();
        target.birthdate = candidate.birthdate.clone();

        self.store.rewrite(&loaded.persons)?;
        Logger::info(
            "PERSON_UPDATED",
            &[("id", &candidate.id), ("original_id", original_id)],
        );
        Ok(())
    }

    /// Records demerit points against a person and applies the
    /// suspension rule.
    ///
    /// The offense date must be a valid DD-MM-YYYY date and the points
    /// must lie in 1..=6. The entry is inserted into the person's
    /// history (overwriting any entry for the same date), then points
    /// within the age-appropriate trailing window from "today" are
    /// summed: under 21 uses 12 months and a threshold of 6, otherwise
    /// 24 months and a threshold of 12. Strictly exceeding the threshold
    /// sets the suspension flag; nothing ever clears it.
    ///
    /// Returns whether the person is suspended after the call. Success
    /// is reported regardless of the suspension outcome.
    ///
    /// # Errors
    ///
    /// `InvalidField` for a bad date, bad points or an unparseable
    /// stored birthdate, `NotFound` for an unknown identifier, `Store`
    /// for backing-file failures. The file is not touched on failure.
    pub fn add_demerit_points(
        &self,
        person_id: &str,
        offense_date: &str,
        points: u32,
    ) -> RegistryResult<bool> {
        let date = parse_date(offense_date)
            .ok_or_else(|| RegistryError::invalid_field("offense date", offense_date))?;
        if !(1..=6).contains(&points) {
            return Err(RegistryError::invalid_field("points", points.to_string()));
        }

        let mut loaded = self.store.load()?;
        let target = loaded
            .find_mut(person_id)
            .ok_or_else(|| RegistryError::NotFound(person_id.to_string()))?;

        let birth = parse_date(&target.birthdate)
            .ok_or_else(|| RegistryError::invalid_field("stored birthdate", target.birthdate.as_str()))?;
        let age = age_in_years(birth, self.today);

        target.demerit_points.insert(date, points);

        let (window_months, threshold) = if age < YOUNG_DRIVER_AGE {
            (12, YOUNG_DRIVER_THRESHOLD)
        } else {
            (24, ADULT_DRIVER_THRESHOLD)
        };
        let window_start = self
            .today
            .checked_sub_months(Months::new(window_months))
            .unwrap_or(NaiveDate::MIN);
        let windowed_total: u32 = target
            .demerit_points
            .iter()
            .filter(|(d, _)| **d >= window_start && **d <= self.today)
            .map(|(_, p)| *p)
            .sum();

        if windowed_total > threshold {
            target.suspended = true;
        }
        let suspended = target.suspended;

        self.store.rewrite(&loaded.persons)?;
        Logger::info(
            "DEMERIT_POINTS_ADDED",
            &[
                ("id", person_id),
                ("offense_date", offense_date),
                ("points", &points.to_string()),
                ("suspended", if suspended { "true" } else { "false" }),
            ],
        );
        Ok(suspended)
    }
}

/// True when the first character of the identifier is an even ASCII digit.
fn has_even_leading_digit(id: &str) -> bool {
    id.chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .map(|d| d % 2 == 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn registry_in(dir: &TempDir) -> Registry {
        let store = PersonStore::new(dir.path().join("persons.txt"));
        // Fixed reference date keeps ages and windows reproducible.
        Registry::with_reference_date(store, date("01-11-2023"))
    }

    fn valid_person(id: &str, birthdate: &str) -> Person {
        Person::new(
            id,
            "John",
            "Doe",
            "32|Highland Street|Melbourne|Victoria|Australia",
            birthdate,
        )
    }

    #[test]
    fn test_add_person_valid() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("56s_d%&fAB", "15-11-1990"))
            .unwrap();
        assert!(registry.store().load().unwrap().find("56s_d%&fAB").is_some());
    }

    #[test]
    fn test_add_person_invalid_id() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        let err = registry
            .add_person(valid_person("12345678AB", "20-05-1995"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidField { field: "person id", .. }));
        assert!(registry.store().load().unwrap().persons.is_empty());
    }

    #[test]
    fn test_add_person_invalid_address_state() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        let mut person = valid_person("78#$%@*ABC", "10-03-1988");
        person.address = "123|Queen Street|Sydney|NSW|Australia".to_string();
        let err = registry.add_person(person).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidField { field: "address", .. }));
    }

    #[test]
    fn test_add_person_invalid_birthdate_format() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        let err = registry
            .add_person(valid_person("29!@#$%XYZ", "1990-11-15"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidField { field: "birthdate", .. }));
    }

    #[test]
    fn test_add_person_duplicate_id() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("56s_d%&fAB", "15-11-1990"))
            .unwrap();
        let err = registry
            .add_person(valid_person("56s_d%&fAB", "20-05-1995"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateId(_)));
        assert_eq!(registry.store().load().unwrap().persons.len(), 1);
    }

    #[test]
    fn test_update_unknown_id() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        let err = registry
            .update_personal_details("56s_d%&fAB", &valid_person("56s_d%&fAB", "15-11-1990"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[test]
    fn test_update_names_for_adult() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("34@#$%^GHI", "15-06-1985"))
            .unwrap();

        let mut candidate = valid_person("34@#$%^GHI", "15-06-1985");
        candidate.first_name = "Daniel".to_string();
        candidate.last_name = "Li".to_string();
        candidate.address = "56|Spencer Street|Melbourne|Victoria|Australia".to_string();
        registry
            .update_personal_details("34@#$%^GHI", &candidate)
            .unwrap();

        let loaded = registry.store().load().unwrap();
        let person = loaded.find("34@#$%^GHI").unwrap();
        assert_eq!(person.first_name, "Daniel");
        assert_eq!(
            person.address,
            "56|Spencer Street|Melbourne|Victoria|Australia"
        );
    }

    #[test]
    fn test_update_minor_cannot_change_address() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("45#$%@*JKL", "15-06-2010"))
            .unwrap();

        let mut candidate = valid_person("45#$%@*JKL", "15-06-2010");
        candidate.address = "90|Swanston Street|Melbourne|Victoria|Australia".to_string();
        let err = registry
            .update_personal_details("45#$%@*JKL", &candidate)
            .unwrap_err();
        assert!(matches!(err, RegistryError::PolicyViolation(_)));
    }

    #[test]
    fn test_update_birthdate_change_must_be_exclusive() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("67*&^%$MNO", "20-08-1990"))
            .unwrap();

        let mut candidate = valid_person("67*&^%$MNO", "21-08-1990");
        candidate.first_name = "Francis".to_string();
        let err = registry
            .update_personal_details("67*&^%$MNO", &candidate)
            .unwrap_err();
        assert!(matches!(err, RegistryError::PolicyViolation(_)));
    }

    #[test]
    fn test_update_birthdate_alone_succeeds() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("35%^&*@VWX", "30-09-1987"))
            .unwrap();

        let candidate = valid_person("35%^&*@VWX", "01-10-1987");
        registry
            .update_personal_details("35%^&*@VWX", &candidate)
            .unwrap();
        let loaded = registry.store().load().unwrap();
        assert_eq!(loaded.find("35%^&*@VWX").unwrap().birthdate, "01-10-1987");
    }

    #[test]
    fn test_update_new_birthdate_must_be_valid() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("35%^&*@VWX", "30-09-1987"))
            .unwrap();

        let candidate = valid_person("35%^&*@VWX", "31-02-1987");
        let err = registry
            .update_personal_details("35%^&*@VWX", &candidate)
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidField { field: "birthdate", .. }));
    }

    #[test]
    fn test_update_even_leading_digit_locks_id() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("89!@#$%PQR", "12-04-1993"))
            .unwrap();

        let candidate = valid_person("23@#$%^STU", "12-04-1993");
        let err = registry
            .update_personal_details("89!@#$%PQR", &candidate)
            .unwrap_err();
        assert!(matches!(err, RegistryError::PolicyViolation(_)));
    }

    #[test]
    fn test_update_odd_leading_digit_allows_id_change() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("35%^&*@VWX", "30-09-1987"))
            .unwrap();

        let candidate = valid_person("23@#$%^STU", "30-09-1987");
        registry
            .update_personal_details("35%^&*@VWX", &candidate)
            .unwrap();
        let loaded = registry.store().load().unwrap();
        assert!(loaded.find("23@#$%^STU").is_some());
        assert!(loaded.find("35%^&*@VWX").is_none());
    }

    #[test]
    fn test_update_changed_id_is_revalidated() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("35%^&*@VWX", "30-09-1987"))
            .unwrap();

        let candidate = valid_person("12345678AB", "30-09-1987");
        let err = registry
            .update_personal_details("35%^&*@VWX", &candidate)
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidField { field: "person id", .. }));
    }

    #[test]
    fn test_update_preserves_history_and_suspension() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("35%^&*@VWX", "30-09-1987"))
            .unwrap();
        registry
            .add_demerit_points("35%^&*@VWX", "20-10-2023", 3)
            .unwrap();

        let mut candidate = valid_person("35%^&*@VWX", "30-09-1987");
        candidate.first_name = "Henry".to_string();
        registry
            .update_personal_details("35%^&*@VWX", &candidate)
            .unwrap();

        let loaded = registry.store().load().unwrap();
        let person = loaded.find("35%^&*@VWX").unwrap();
        assert_eq!(person.demerit_points.get(&date("20-10-2023")), Some(&3));
    }

    #[test]
    fn test_demerit_points_out_of_range() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("57@#$%^BCD", "22-07-1990"))
            .unwrap();

        for bad in [0, 7, 8] {
            let err = registry
                .add_demerit_points("57@#$%^BCD", "15-10-2023", bad)
                .unwrap_err();
            assert!(matches!(err, RegistryError::InvalidField { field: "points", .. }));
        }
        let loaded = registry.store().load().unwrap();
        assert!(loaded.find("57@#$%^BCD").unwrap().demerit_points.is_empty());
    }

    #[test]
    fn test_demerit_invalid_date_format() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("68*&^%$EFG", "10-12-1988"))
            .unwrap();

        let err = registry
            .add_demerit_points("68*&^%$EFG", "2023-11-15", 2)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidField { field: "offense date", .. }
        ));
        let loaded = registry.store().load().unwrap();
        assert!(loaded.find("68*&^%$EFG").unwrap().demerit_points.is_empty());
    }

    #[test]
    fn test_demerit_unknown_person() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        let err = registry
            .add_demerit_points("46#$%@*YZA", "20-11-2023", 3)
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[test]
    fn test_demerit_young_driver_suspension() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        // 18 years old at the reference date of 01-11-2023.
        registry
            .add_person(valid_person("79!@#$%HIJ", "15-06-2005"))
            .unwrap();

        assert!(!registry
            .add_demerit_points("79!@#$%HIJ", "10-01-2023", 4)
            .unwrap());
        assert!(registry
            .add_demerit_points("79!@#$%HIJ", "15-02-2023", 4)
            .unwrap());

        let loaded = registry.store().load().unwrap();
        assert!(loaded.find("79!@#$%HIJ").unwrap().suspended);
    }

    #[test]
    fn test_demerit_adult_suspension() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("24%^&*@KLM", "20-01-1980"))
            .unwrap();

        assert!(!registry
            .add_demerit_points("24%^&*@KLM", "05-03-2023", 6)
            .unwrap());
        // 12 points does not strictly exceed the threshold of 12.
        assert!(!registry
            .add_demerit_points("24%^&*@KLM", "10-06-2023", 6)
            .unwrap());
        assert!(registry
            .add_demerit_points("24%^&*@KLM", "20-08-2023", 3)
            .unwrap());

        let loaded = registry.store().load().unwrap();
        assert!(loaded.find("24%^&*@KLM").unwrap().suspended);
    }

    #[test]
    fn test_demerit_points_outside_window_ignored() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("24%^&*@KLM", "20-01-1980"))
            .unwrap();

        // Well outside the 24-month window ending 01-11-2023.
        assert!(!registry
            .add_demerit_points("24%^&*@KLM", "05-03-2019", 6)
            .unwrap());
        assert!(!registry
            .add_demerit_points("24%^&*@KLM", "10-06-2020", 6)
            .unwrap());
        // Only 5 points fall inside the window.
        assert!(!registry
            .add_demerit_points("24%^&*@KLM", "20-08-2023", 5)
            .unwrap());
    }

    #[test]
    fn test_demerit_same_date_overwrites() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("57@#$%^BCD", "22-07-1990"))
            .unwrap();

        registry
            .add_demerit_points("57@#$%^BCD", "15-10-2023", 2)
            .unwrap();
        registry
            .add_demerit_points("57@#$%^BCD", "15-10-2023", 5)
            .unwrap();

        let loaded = registry.store().load().unwrap();
        let person = loaded.find("57@#$%^BCD").unwrap();
        assert_eq!(person.demerit_points.len(), 1);
        assert_eq!(person.demerit_points.get(&date("15-10-2023")), Some(&5));
    }

    #[test]
    fn test_suspension_is_monotonic() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        registry
            .add_person(valid_person("79!@#$%HIJ", "15-06-2005"))
            .unwrap();
        registry
            .add_demerit_points("79!@#$%HIJ", "10-01-2023", 4)
            .unwrap();
        registry
            .add_demerit_points("79!@#$%HIJ", "15-02-2023", 4)
            .unwrap();

        // A later entry dated far outside the window does not clear it.
        assert!(registry
            .add_demerit_points("79!@#$%HIJ", "01-01-2010", 1)
            .unwrap());
        assert!(registry.store().load().unwrap().find("79!@#$%HIJ").unwrap().suspended);
    }
}

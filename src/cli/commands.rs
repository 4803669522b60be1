//! CLI command implementations
//!
//! Each command builds a [`Registry`] over the chosen backing file,
//! invokes one workflow and prints a human-readable outcome. `list`
//! additionally supports JSON output for scripting.

use std::path::PathBuf;

use serde_json::{json, Value};

use crate::person::Person;
use crate::registry::Registry;
use crate::store::PersonStore;
use crate::validate::DATE_FORMAT;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Parse arguments and dispatch to the selected command.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    match cli.command {
        Command::Add {
            file,
            id,
            first_name,
            last_name,
            address,
            birthdate,
        } => cmd_add(file, id, first_name, last_name, address, birthdate),
        Command::Update {
            file,
            original_id,
            id,
            first_name,
            last_name,
            address,
            birthdate,
        } => cmd_update(file, original_id, id, first_name, last_name, address, birthdate),
        Command::Demerit {
            file,
            id,
            date,
            points,
        } => cmd_demerit(file, id, date, points),
        Command::List { file, json } => cmd_list(file, json),
        Command::Show { file, id } => cmd_show(file, id),
    }
}

fn cmd_add(
    file: PathBuf,
    id: String,
    first_name: String,
    last_name: String,
    address: String,
    birthdate: String,
) -> CliResult<()> {
    let registry = Registry::new(PersonStore::new(file));
    let candidate = Person::new(id, first_name, last_name, address, birthdate);
    let id = candidate.id.clone();
    registry.add_person(candidate)?;
    println!("added {}", id);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_update(
    file: PathBuf,
    original_id: String,
    id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    address: Option<String>,
    birthdate: Option<String>,
) -> CliResult<()> {
    let store = PersonStore::new(file);

    // Fill omitted flags from the stored record so the workflow sees a
    // fully populated candidate.
    let existing = store
        .load()
        .map_err(|e| CliError::operation_failed(e.to_string()))?
        .find(&original_id)
        .cloned()
        .ok_or_else(|| CliError::not_found(&original_id))?;

    let candidate = Person::new(
        id.unwrap_or_else(|| existing.id.clone()),
        first_name.unwrap_or_else(|| existing.first_name.clone()),
        last_name.unwrap_or_else(|| existing.last_name.clone()),
        address.unwrap_or_else(|| existing.address.clone()),
        birthdate.unwrap_or_else(|| existing.birthdate.clone()),
    );

    let registry = Registry::new(store);
    registry.update_personal_details(&original_id, &candidate)?;
    println!("updated {}", original_id);
    Ok(())
}

fn cmd_demerit(file: PathBuf, id: String, date: String, points: u32) -> CliResult<()> {
    let registry = Registry::new(PersonStore::new(file));
    let suspended = registry.add_demerit_points(&id, &date, points)?;
    if suspended {
        println!("recorded {} points for {} (suspended)", points, id);
    } else {
        println!("recorded {} points for {}", points, id);
    }
    Ok(())
}

fn cmd_list(file: PathBuf, as_json: bool) -> CliResult<()> {
    let store = PersonStore::new(file);
    let loaded = store
        .load()
        .map_err(|e| CliError::operation_failed(e.to_string()))?;

    if as_json {
        let values: Vec<Value> = loaded.persons.iter().map(person_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&values).unwrap_or_default());
    } else {
        for person in &loaded.persons {
            println!("{}", render_person(person));
        }
    }
    Ok(())
}

fn cmd_show(file: PathBuf, id: String) -> CliResult<()> {
    let store = PersonStore::new(file);
    let loaded = store
        .load()
        .map_err(|e| CliError::operation_failed(e.to_string()))?;
    let person = loaded.find(&id).ok_or_else(|| CliError::not_found(&id))?;
    println!("{}", render_person(person));
    Ok(())
}

fn render_person(person: &Person) -> String {
    let total: u32 = person.demerit_points.values().sum();
    format!(
        "{}  {} {}  born {}  {}  {} demerit point(s)",
        person.id,
        person.first_name,
        person.last_name,
        person.birthdate,
        if person.suspended {
            "SUSPENDED"
        } else {
            "active"
        },
        total
    )
}

fn person_to_json(person: &Person) -> Value {
    let mut demerits = serde_json::Map::new();
    for (date, points) in &person.demerit_points {
        demerits.insert(
            date.format(DATE_FORMAT).to_string(),
            Value::from(*points),
        );
    }
    json!({
        "id": person.id,
        "firstName": person.first_name,
        "lastName": person.last_name,
        "address": person.address,
        "birthdate": person.birthdate,
        "suspended": person.suspended,
        "demeritPoints": Value::Object(demerits),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_person_plain() {
        let person = Person::new(
            "56s_d%&fAB",
            "John",
            "Doe",
            "32|Highland Street|Melbourne|Victoria|Australia",
            "15-11-1990",
        );
        let rendered = render_person(&person);
        assert!(rendered.contains("56s_d%&fAB"));
        assert!(rendered.contains("John Doe"));
        assert!(rendered.contains("active"));
    }

    #[test]
    fn test_person_to_json_shape() {
        let mut person = Person::new(
            "56s_d%&fAB",
            "John",
            "Doe",
            "32|Highland Street|Melbourne|Victoria|Australia",
            "15-11-1990",
        );
        person
            .demerit_points
            .insert(crate::validate::parse_date("20-11-2023").unwrap(), 3);

        let value = person_to_json(&person);
        assert_eq!(value["id"], "56s_d%&fAB");
        assert_eq!(value["suspended"], false);
        assert_eq!(value["demeritPoints"]["20-11-2023"], 3);
    }
}

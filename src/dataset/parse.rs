use std::collections::BTreeMap;

use serde::Deserialize;

use super::person::Person;

#[derive(Debug, Deserialize)]
struct RawPerson {
    name: String,
    avatar: String,
    mutual: Vec<String>,
}

/// Parses the `{ id: { name, avatar, mutual } }` map. People come back ordered by id.
pub fn parse_people(raw: &str) -> Result<Vec<Person>, serde_json::Error> {
    let records: BTreeMap<String, RawPerson> = serde_json::from_str(raw)?;

    Ok(records
        .into_iter()
        .map(|(id, record)| Person {
            id,
            name: record.name,
            avatar_url: record.avatar,
            servers: record.mutual.into_iter().collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_in_id_order() {
        let raw = r#"{
            "2": {"name": "bob", "avatar": "https://cdn.example/avatars/2/b.png", "mutual": ["10"]},
            "1": {"name": "alice", "avatar": "https://cdn.example/avatars/1/a.png", "mutual": ["10", "20"]}
        }"#;

        let people = parse_people(raw).expect("dataset parses");
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].id, "1");
        assert_eq!(people[0].name, "alice");
        assert_eq!(people[0].mutual_count(), 2);
        assert_eq!(people[1].avatar_url, "https://cdn.example/avatars/2/b.png");
    }

    #[test]
    fn duplicate_servers_collapse() {
        let raw = r#"{"1": {"name": "a", "avatar": "x", "mutual": ["10", "10", "20"]}}"#;
        let people = parse_people(raw).expect("dataset parses");
        assert_eq!(people[0].mutual_count(), 2);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let raw = r#"{"1": {"name": "a", "avatar": "x", "mutual": [], "discriminator": "0001"}}"#;
        assert!(parse_people(raw).is_ok());
    }

    #[test]
    fn missing_field_is_rejected() {
        let raw = r#"{"1": {"name": "a", "mutual": []}}"#;
        assert!(parse_people(raw).is_err());
    }

    #[test]
    fn non_string_server_is_rejected() {
        let raw = r#"{"1": {"name": "a", "avatar": "x", "mutual": [10]}}"#;
        assert!(parse_people(raw).is_err());
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(parse_people("[]").is_err());
    }
}

//! Contact book: name, phone number, email and address records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{required, Result};
use crate::store::{PersistPolicy, Record, RecordStore};

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Generated on creation. Files written before ids existed get one on load.
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
}

impl Record for Contact {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.phone_number)
    }
}

/// User-supplied contact fields. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
}

impl ContactDraft {
    pub fn new(
        name: impl Into<String>,
        phone_number: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
            email: email.into(),
            address: address.into(),
        }
    }

    /// Builds a contact with the given id, rejecting blank fields.
    fn into_contact(self, id: String) -> Result<Contact> {
        Ok(Contact {
            id,
            name: required("name", &self.name)?.to_string(),
            phone_number: required("phone number", &self.phone_number)?.to_string(),
            email: required("email", &self.email)?.to_string(),
            address: required("address", &self.address)?.to_string(),
        })
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Contacts backed by one JSON file.
#[derive(Debug)]
pub struct ContactBook {
    store: RecordStore<Contact>,
}

impl ContactBook {
    pub fn open(path: impl AsRef<Path>, policy: PersistPolicy) -> Result<Self> {
        Ok(Self {
            store: RecordStore::open(path, policy)?,
        })
    }

    /// Adds a contact. Duplicate names are allowed.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub fn add(&mut self, draft: ContactDraft) -> Result<Contact> {
        let contact = draft.into_contact(new_id())?;
        self.store.insert(contact.clone())?;
        info!(id = %contact.id, "contact added");
        Ok(contact)
    }

    /// All contacts in insertion order.
    pub fn list(&self) -> &[Contact] {
        self.store.records()
    }

    /// Case-insensitive match on the name, or a plain substring match on the
    /// phone number.
    pub fn search(&self, term: &str) -> Vec<&Contact> {
        let needle = term.to_lowercase();
        self.store
            .records()
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle) || c.phone_number.contains(term))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.store.get(id)
    }

    /// Replaces the first contact named exactly `old_name`. The replacement
    /// keeps the original id.
    #[instrument(skip(self, draft))]
    pub fn update(&mut self, old_name: &str, draft: ContactDraft) -> Result<bool> {
        let old_name = required("old name", old_name)?;
        let mut replacement = draft.into_contact(String::new())?;
        let Some(index) = self.store.position(|c| c.name == old_name) else {
            info!("no contact with that name");
            return Ok(false);
        };
        replacement.id = self.store.records()[index].id.clone();
        self.store.replace_first(|c| c.name == old_name, replacement)
    }

    /// Replaces the contact with the given id.
    #[instrument(skip(self, draft))]
    pub fn update_by_id(&mut self, id: &str, draft: ContactDraft) -> Result<bool> {
        let replacement = draft.into_contact(id.to_string())?;
        self.store.replace_first(|c| c.id == id, replacement)
    }

    /// Removes every contact named exactly `name` and returns how many were
    /// removed. The file is rewritten even when nothing matched.
    #[instrument(skip(self))]
    pub fn delete(&mut self, name: &str) -> Result<usize> {
        let name = required("name", name)?;
        let removed = self.store.remove_where(|c| c.name == name)?;
        if removed == 0 {
            self.store.commit()?;
        }
        info!(removed, "contacts deleted by name");
        Ok(removed)
    }

    /// Removes the contact with the given id.
    #[instrument(skip(self))]
    pub fn delete_by_id(&mut self, id: &str) -> Result<bool> {
        Ok(self.store.remove_where(|c| c.id == id)? > 0)
    }

    /// Writes pending changes when running under the deferred policy.
    pub fn flush(&mut self) -> Result<()> {
        self.store.flush()
    }

    pub fn store(&self) -> &RecordStore<Contact> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use std::fs;
    use tempfile::tempdir;

    fn ada() -> ContactDraft {
        ContactDraft::new("Ada Lovelace", "555-0100", "ada@example.com", "12 St James's Sq")
    }

    fn book(dir: &tempfile::TempDir) -> ContactBook {
        ContactBook::open(dir.path().join("contacts.json"), PersistPolicy::Immediate).unwrap()
    }

    #[test]
    fn add_rejects_blank_fields_without_mutation() {
        let dir = tempdir().unwrap();
        let mut contacts = book(&dir);

        let mut draft = ada();
        draft.email = "  ".into();
        let err = contacts.add(draft).unwrap_err();

        assert!(matches!(err, StoreError::MissingField("email")));
        assert!(contacts.list().is_empty());
        assert!(!dir.path().join("contacts.json").exists());
    }

    #[test]
    fn search_matches_name_case_insensitively_or_phone() {
        let dir = tempdir().unwrap();
        let mut contacts = book(&dir);
        contacts.add(ada()).unwrap();
        contacts
            .add(ContactDraft::new("Grace Hopper", "555-0199", "grace@example.com", "Arlington"))
            .unwrap();

        let by_name: Vec<_> = contacts.search("ADA").iter().map(|c| c.name.clone()).collect();
        assert_eq!(by_name, vec!["Ada Lovelace"]);

        let by_phone: Vec<_> = contacts.search("0199").iter().map(|c| c.name.clone()).collect();
        assert_eq!(by_phone, vec!["Grace Hopper"]);

        assert_eq!(contacts.search("555").len(), 2);
        assert_eq!(contacts.search("").len(), 2);
        assert!(contacts.search("nobody").is_empty());
    }

    #[test]
    fn phone_match_is_case_sensitive() {
        let dir = tempdir().unwrap();
        let mut contacts = book(&dir);
        contacts
            .add(ContactDraft::new("Florist", "1-800-FLOWERS", "shop@example.com", "Main St"))
            .unwrap();
        contacts
            .add(ContactDraft::new("Flowers Inc", "555-0123", "inc@example.com", "Elm St"))
            .unwrap();

        let names = |term: &str| -> Vec<String> {
            contacts.search(term).iter().map(|c| c.name.clone()).collect()
        };
        assert_eq!(names("FLOWERS"), vec!["Florist", "Flowers Inc"]);
        assert_eq!(names("flowers"), vec!["Flowers Inc"]);
        assert_eq!(names("800-F"), vec!["Florist"]);
        assert!(names("800-f").is_empty());
    }

    #[test]
    fn blank_names_are_rejected_without_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        let mut contacts = book(&dir);

        assert!(matches!(contacts.delete(""), Err(StoreError::MissingField("name"))));
        assert!(matches!(contacts.delete("  "), Err(StoreError::MissingField("name"))));
        assert!(matches!(
            contacts.update("", ada()),
            Err(StoreError::MissingField("old name"))
        ));
        assert!(!path.exists());
        assert!(contacts.list().is_empty());
    }

    #[test]
    fn update_replaces_first_match_only_and_keeps_id() {
        let dir = tempdir().unwrap();
        let mut contacts = book(&dir);
        let first = contacts.add(ada()).unwrap();
        let second = contacts.add(ada()).unwrap();

        let found = contacts
            .update("Ada Lovelace", ContactDraft::new("Ada King", "555-0101", "ak@example.com", "Ockham"))
            .unwrap();
        assert!(found);

        let list = contacts.list();
        assert_eq!(list[0].id, first.id);
        assert_eq!(list[0].name, "Ada King");
        assert_eq!(list[1], second);
    }

    #[test]
    fn update_missing_name_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        let mut contacts = book(&dir);
        contacts.add(ada()).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        assert!(!contacts.update("Nobody", ada()).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert_eq!(contacts.list().len(), 1);
    }

    #[test]
    fn update_with_blank_draft_is_rejected() {
        let dir = tempdir().unwrap();
        let mut contacts = book(&dir);
        contacts.add(ada()).unwrap();

        let err = contacts.update("Ada Lovelace", ContactDraft::default()).unwrap_err();
        assert!(matches!(err, StoreError::MissingField("name")));
        assert_eq!(contacts.list()[0].name, "Ada Lovelace");
    }

    #[test]
    fn delete_by_name_removes_every_match_and_always_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        let mut contacts = book(&dir);

        assert_eq!(contacts.delete("Nobody").unwrap(), 0);
        assert!(path.exists());

        contacts.add(ada()).unwrap();
        contacts.add(ada()).unwrap();
        contacts
            .add(ContactDraft::new("Grace Hopper", "555-0199", "grace@example.com", "Arlington"))
            .unwrap();

        assert_eq!(contacts.delete("Ada Lovelace").unwrap(), 2);
        let reopened = book(&dir);
        assert_eq!(reopened.list().len(), 1);
        assert_eq!(reopened.list()[0].name, "Grace Hopper");
    }

    #[test]
    fn id_operations_target_a_single_duplicate() {
        let dir = tempdir().unwrap();
        let mut contacts = book(&dir);
        let first = contacts.add(ada()).unwrap();
        let second = contacts.add(ada()).unwrap();

        assert!(contacts
            .update_by_id(&second.id, ContactDraft::new("Ada B", "1", "b@example.com", "B"))
            .unwrap());
        assert_eq!(contacts.get(&first.id).unwrap().name, "Ada Lovelace");
        assert_eq!(contacts.get(&second.id).unwrap().name, "Ada B");

        assert!(contacts.delete_by_id(&first.id).unwrap());
        assert!(!contacts.delete_by_id(&first.id).unwrap());
        assert_eq!(contacts.list(), &[contacts.get(&second.id).unwrap().clone()]);
    }

    #[test]
    fn legacy_file_without_ids_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        fs::write(
            &path,
            r#"[{"name": "Ada", "phone_number": "1", "email": "a@x", "address": "here"},
                {"name": "Bob", "phone_number": "2", "email": "b@x", "address": "there"}]"#,
        )
        .unwrap();

        let contacts = book(&dir);
        let list = contacts.list();
        assert_eq!(list.len(), 2);
        assert!(!list[0].id.is_empty());
        assert_ne!(list[0].id, list[1].id);
        assert_eq!(list[1].to_string(), "Bob - 2");
    }
}

// SecretCLI — Secret record data models
//
// SECURITY: `SecretRecord::password` holds ciphertext only and is private;
// it can be replaced only by turning a `SecretDraft` back into a record,
// which re-encrypts through the cipher. Plaintext passwords live in
// `Zeroizing` buffers and never appear in Debug output.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::enclave::{Cipher, EnclaveError};

/// A committed credential record, exactly as persisted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub id: Uuid,
    pub title: String,
    pub username: String,
    /// Cipher output (`v1:...`), never plaintext.
    password: String,
    pub note: String,
    pub email: String,
    pub website: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SecretRecord {
    /// Build a fresh record from new input and its already-encrypted password.
    pub(crate) fn create(
        input: NewSecret,
        encrypted_password: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            username: input.username,
            password: encrypted_password,
            note: input.note,
            email: input.email,
            website: input.website,
            created_at,
            updated_at: None,
        }
    }

    /// The stored ciphertext. Decrypt with `Cipher::decrypt`.
    pub fn encrypted_password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretRecord")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("note", &self.note)
            .field("email", &self.email)
            .field("website", &self.website)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl fmt::Display for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if !self.username.is_empty() {
            write!(f, " ({})", self.username)?;
        }
        if !self.website.is_empty() {
            write!(f, " — {}", self.website)?;
        }
        Ok(())
    }
}

/// Input for adding a secret. The password is still plaintext here.
pub struct NewSecret {
    pub title: String,
    pub username: String,
    pub password: Zeroizing<String>,
    pub note: String,
    pub email: String,
    pub website: String,
}

impl NewSecret {
    pub fn new(title: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            username: String::new(),
            password: Zeroizing::new(password.into()),
            note: String::new(),
            email: String::new(),
            website: String::new(),
        }
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn website(mut self, website: impl Into<String>) -> Self {
        self.website = website.into();
        self
    }
}

/// One of the six user-editable fields, numbered as in the edit menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretField {
    Title,
    Username,
    Password,
    Note,
    Email,
    Website,
}

impl SecretField {
    pub const ALL: [SecretField; 6] = [
        SecretField::Title,
        SecretField::Username,
        SecretField::Password,
        SecretField::Note,
        SecretField::Email,
        SecretField::Website,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SecretField::Title => "Title",
            SecretField::Username => "Username",
            SecretField::Password => "Password",
            SecretField::Note => "Note",
            SecretField::Email => "Email",
            SecretField::Website => "Website",
        }
    }

    /// Menu number (1-based).
    pub fn menu_number(self) -> usize {
        match self {
            SecretField::Title => 1,
            SecretField::Username => 2,
            SecretField::Password => 3,
            SecretField::Note => 4,
            SecretField::Email => 5,
            SecretField::Website => 6,
        }
    }

    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        let number: usize = choice.trim().parse().ok()?;
        Self::ALL.into_iter().find(|f| f.menu_number() == number)
    }
}

/// Working copy for the field-by-field edit flow.
///
/// A draft is detached from the store: changes accumulate here and reach
/// disk only through `SecretStore::commit`. Dropping a draft discards them.
pub struct SecretDraft {
    id: Uuid,
    created_at: DateTime<Utc>,
    encrypted_password: String,
    new_password: Option<Zeroizing<String>>,
    pub title: String,
    pub username: String,
    pub note: String,
    pub email: String,
    pub website: String,
}

impl SecretDraft {
    pub fn from_record(record: &SecretRecord) -> Self {
        Self {
            id: record.id,
            created_at: record.created_at,
            encrypted_password: record.password.clone(),
            new_password: None,
            title: record.title.clone(),
            username: record.username.clone(),
            note: record.note.clone(),
            email: record.email.clone(),
            website: record.website.clone(),
        }
    }

    /// Id of the record this draft was taken from.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn set(&mut self, field: SecretField, value: String) {
        match field {
            SecretField::Title => self.title = value,
            SecretField::Username => self.username = value,
            SecretField::Password => self.set_password(Zeroizing::new(value)),
            SecretField::Note => self.note = value,
            SecretField::Email => self.email = value,
            SecretField::Website => self.website = value,
        }
    }

    pub fn set_password(&mut self, password: Zeroizing<String>) {
        self.new_password = Some(password);
    }

    pub fn password_changed(&self) -> bool {
        self.new_password.is_some()
    }

    /// Seal the draft into a committable record: encrypt the password if it
    /// changed, keep `id` and `created_at`, stamp `updated_at`.
    pub fn into_record(
        self,
        cipher: &Cipher,
        now: DateTime<Utc>,
    ) -> std::result::Result<SecretRecord, EnclaveError> {
        let password = match &self.new_password {
            Some(plaintext) => cipher.encrypt(plaintext)?,
            None => self.encrypted_password.clone(),
        };

        Ok(SecretRecord {
            id: self.id,
            title: self.title,
            username: self.username,
            password,
            note: self.note,
            email: self.email,
            website: self.website,
            created_at: self.created_at,
            updated_at: Some(now),
        })
    }
}

impl fmt::Debug for SecretDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretDraft")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password_changed", &self.password_changed())
            .finish_non_exhaustive()
    }
}

/// One row of a listing. `password` carries the per-record decrypt outcome
/// so one bad entry never aborts the whole listing.
pub struct ListedSecret<'a> {
    pub index: usize,
    pub record: &'a SecretRecord,
    pub password: std::result::Result<Zeroizing<String>, EnclaveError>,
}

/// Plaintext export row. Only ever built transiently inside `export`.
#[derive(Serialize)]
pub(crate) struct ExportedSecret<'a> {
    pub title: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub note: &'a str,
    pub email: &'a str,
    pub website: &'a str,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> Cipher {
        Cipher::new(&[3u8; 32]).unwrap()
    }

    fn sample_record(cipher: &Cipher) -> SecretRecord {
        let input = NewSecret::new("Bank", "p@ss1234")
            .username("alice")
            .website("bank.com");
        let encrypted = cipher.encrypt(&input.password).unwrap();
        SecretRecord::create(input, encrypted, Utc::now())
    }

    #[test]
    fn test_record_debug_redacts_password() {
        let cipher = cipher();
        let record = sample_record(&cipher);

        let debug_output = format!("{:?}", record);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(record.encrypted_password()));
        assert!(!debug_output.contains("p@ss1234"));
    }

    #[test]
    fn test_record_display_is_a_summary() {
        let record = sample_record(&cipher());
        assert_eq!(record.to_string(), "Bank (alice) — bank.com");
    }

    #[test]
    fn test_new_record_has_no_updated_at() {
        let record = sample_record(&cipher());
        assert!(record.updated_at.is_none());
        assert!(record.encrypted_password().starts_with("v1:"));
    }

    #[test]
    fn test_serialized_record_omits_absent_updated_at() {
        let record = sample_record(&cipher());
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("updated_at"));
        assert!(!json.contains("p@ss1234"));

        let back: SecretRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_menu_choice_parsing() {
        assert_eq!(SecretField::from_menu_choice("1"), Some(SecretField::Title));
        assert_eq!(SecretField::from_menu_choice(" 3 "), Some(SecretField::Password));
        assert_eq!(SecretField::from_menu_choice("6"), Some(SecretField::Website));
        assert_eq!(SecretField::from_menu_choice("0"), None);
        assert_eq!(SecretField::from_menu_choice("7"), None);
        assert_eq!(SecretField::from_menu_choice("title"), None);
    }

    #[test]
    fn test_draft_without_password_change_keeps_ciphertext() {
        let cipher = cipher();
        let record = sample_record(&cipher);

        let mut draft = SecretDraft::from_record(&record);
        draft.set(SecretField::Note, "rotated quarterly".to_string());
        assert!(!draft.password_changed());

        let now = Utc::now();
        let updated = draft.into_record(&cipher, now).unwrap();
        assert_eq!(updated.encrypted_password(), record.encrypted_password());
        assert_eq!(updated.note, "rotated quarterly");
        assert_eq!(updated.id, record.id);
        assert_eq!(updated.created_at, record.created_at);
        assert_eq!(updated.updated_at, Some(now));
    }

    #[test]
    fn test_draft_password_change_is_encrypted_on_seal() {
        let cipher = cipher();
        let record = sample_record(&cipher);

        let mut draft = SecretDraft::from_record(&record);
        draft.set(SecretField::Password, "n3w-p@ss".to_string());
        assert!(draft.password_changed());

        let updated = draft.into_record(&cipher, Utc::now()).unwrap();
        assert_ne!(updated.encrypted_password(), record.encrypted_password());
        assert_eq!(
            cipher.decrypt(updated.encrypted_password()).unwrap().as_str(),
            "n3w-p@ss"
        );
    }

    #[test]
    fn test_draft_does_not_touch_source_record() {
        let cipher = cipher();
        let record = sample_record(&cipher);
        let snapshot = record.clone();

        let mut draft = SecretDraft::from_record(&record);
        draft.set(SecretField::Title, "Other".to_string());
        draft.set(SecretField::Password, "changed".to_string());
        drop(draft);

        assert_eq!(record, snapshot);
    }
}

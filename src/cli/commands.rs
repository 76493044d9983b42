// SecretCLI — CLI Command Handlers
//
// Each function handles one CLI subcommand. They resolve the key source,
// open the store, and drive the interactive add/edit flows through the
// `Prompter` trait so the flows can be exercised without a terminal.

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::config::Config;
use crate::enclave::{Cipher, KeyFileProvider};
use crate::error::Result;
use crate::store::{
    FileBackend, ListedSecret, NewSecret, SecretField, SecretStore, StoreBackend,
};
use crate::suggest::Suggester;

use super::prompt::{Prompter, TerminalPrompter};
use super::{Cli, Commands};

const PASSWORD_PROMPT: &str = "Enter Password (press Tab for a suggested password): ";
const NEW_PASSWORD_PROMPT: &str = "Enter new Password (press Tab for a suggested password): ";
const SAVE_CHOICE: &str = "7";
const CANCEL_CHOICE: &str = "8";

/// Execute the parsed CLI command.
pub fn execute(cli: Cli) -> Result<()> {
    let config = Config::resolve(
        cli.global.home,
        cli.global.key_file,
        cli.global.suggest_length,
    );

    match cli.command {
        Commands::Init => cmd_init(&config),
        Commands::Add => {
            let mut store = open_store(&config)?;
            add_secret(&mut store, &mut TerminalPrompter::new()).map(|_| ())
        }
        Commands::List => cmd_list(&config),
        Commands::Delete { index } => cmd_delete(&config, index),
        Commands::Edit { index } => {
            let mut store = open_store(&config)?;
            edit_secret(&mut store, &mut TerminalPrompter::new(), index).map(|_| ())
        }
        Commands::Export { output } => cmd_export(&config, output),
        Commands::Suggest { length } => cmd_suggest(&config, length),
    }
}

// ─── Init ────────────────────────────────────────────────────────────────────

fn cmd_init(config: &Config) -> Result<()> {
    std::fs::create_dir_all(config.home())?;

    let provider = KeyFileProvider::new(config.key_file());
    if provider.exists() {
        println!("SecretCLI is already initialized");
        println!("  Key file: {}", provider.path().display());
        return Ok(());
    }

    provider.generate()?;

    println!("✓ SecretCLI initialized");
    println!("  Data directory: {}", config.home().display());
    println!("  Key file:       {}", provider.path().display());
    println!();
    println!("Keep the key file safe: without it the stored passwords cannot be decrypted.");
    if config.has_passphrase() {
        println!("Note: SECRETCLI_PASSPHRASE is set and takes precedence over the key file.");
    }

    Ok(())
}

// ─── Add ─────────────────────────────────────────────────────────────────────

/// Prompt for every field and add the secret. Returns the new index, or
/// `None` if input ended before the required fields were entered.
pub fn add_secret<B: StoreBackend, P: Prompter>(
    store: &mut SecretStore<B>,
    prompter: &mut P,
) -> Result<Option<usize>> {
    prompter.say("Adding a new secret...");

    let Some(title) = prompter.read_line("Enter Title: ")? else {
        prompter.say("Input ended — nothing added.");
        return Ok(None);
    };
    let Some(username) = prompter.read_line("Enter Username: ")? else {
        prompter.say("Input ended — nothing added.");
        return Ok(None);
    };
    let Some(password) = prompter.read_secret(PASSWORD_PROMPT, &|| store.suggest())? else {
        prompter.say("Password entry aborted — nothing added.");
        return Ok(None);
    };

    // Optional fields: end of input simply leaves them empty.
    let note = prompter.read_line("Enter Note (optional): ")?.unwrap_or_default();
    let email = prompter.read_line("Enter Email (optional): ")?.unwrap_or_default();
    let website = prompter.read_line("Enter Website (optional): ")?.unwrap_or_default();

    let index = store.add(NewSecret {
        title,
        username,
        password,
        note,
        email,
        website,
    })?;

    prompter.say(&format!("✓ Secret added at index {}", index));
    Ok(Some(index))
}

// ─── List ────────────────────────────────────────────────────────────────────

fn cmd_list(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let listed = store.list();

    if listed.is_empty() {
        println!("No secrets stored yet.");
        println!("Add one with: secretcli add");
        return Ok(());
    }

    print!("{}", render_listing(&listed));
    Ok(())
}

/// Human-readable listing. Undecryptable entries are marked, not skipped.
pub fn render_listing(listed: &[ListedSecret<'_>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Stored secrets ({}):", listed.len());

    for entry in listed {
        let record = entry.record;
        let password = match &entry.password {
            Ok(plaintext) => plaintext.to_string(),
            Err(e) => format!("<undecryptable: {}>", e),
        };

        let _ = writeln!(out);
        let _ = writeln!(out, "[{}] {}", entry.index, record.title);
        let _ = writeln!(out, "    Username: {}", record.username);
        let _ = writeln!(out, "    Password: {}", password);
        if !record.note.is_empty() {
            let _ = writeln!(out, "    Note:     {}", record.note);
        }
        if !record.email.is_empty() {
            let _ = writeln!(out, "    Email:    {}", record.email);
        }
        if !record.website.is_empty() {
            let _ = writeln!(out, "    Website:  {}", record.website);
        }
        let _ = writeln!(
            out,
            "    Created:  {}",
            record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        if let Some(updated_at) = record.updated_at {
            let _ = writeln!(
                out,
                "    Updated:  {}",
                updated_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }

    out
}

// ─── Delete ──────────────────────────────────────────────────────────────────

fn cmd_delete(config: &Config, index: i64) -> Result<()> {
    let mut store = open_store(config)?;
    let removed = store.delete(index)?;
    println!("✓ Secret {} deleted ({})", index, removed.title);
    Ok(())
}

// ─── Edit ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Saved,
    Cancelled,
}

/// Field-by-field edit of the secret at `index`. Changes accumulate in a
/// draft and are written only when the user picks "Save and Exit".
pub fn edit_secret<B: StoreBackend, P: Prompter>(
    store: &mut SecretStore<B>,
    prompter: &mut P,
    index: i64,
) -> Result<EditOutcome> {
    let mut draft = store.draft(index)?;
    prompter.say(&format!("Editing secret: {}", draft.title));

    loop {
        prompter.say("Select field to edit:");
        for field in SecretField::ALL {
            prompter.say(&format!("{}. {}", field.menu_number(), field.label()));
        }
        prompter.say(&format!("{}. Save and Exit", SAVE_CHOICE));
        prompter.say(&format!("{}. Cancel", CANCEL_CHOICE));

        let Some(choice) = prompter.read_line("Enter your choice (1-8): ")? else {
            prompter.say("Edit cancelled — nothing saved.");
            return Ok(EditOutcome::Cancelled);
        };

        match choice.trim() {
            SAVE_CHOICE => {
                store.commit(index, draft)?;
                prompter.say("✓ Secret updated");
                return Ok(EditOutcome::Saved);
            }
            CANCEL_CHOICE => {
                prompter.say("Edit cancelled — nothing saved.");
                return Ok(EditOutcome::Cancelled);
            }
            other => match SecretField::from_menu_choice(other) {
                Some(SecretField::Password) => {
                    match prompter.read_secret(NEW_PASSWORD_PROMPT, &|| store.suggest())? {
                        Some(password) => draft.set_password(password),
                        None => prompter.say("Password unchanged."),
                    }
                }
                Some(field) => {
                    let prompt = format!("Enter new {}: ", field.label());
                    let Some(value) = prompter.read_line(&prompt)? else {
                        prompter.say("Edit cancelled — nothing saved.");
                        return Ok(EditOutcome::Cancelled);
                    };
                    if field == SecretField::Title && value.trim().is_empty() {
                        prompter.say("Title must not be empty — unchanged.");
                    } else {
                        draft.set(field, value);
                    }
                }
                None => prompter.say("Invalid choice. Please try again."),
            },
        }
    }
}

// ─── Export ──────────────────────────────────────────────────────────────────

fn cmd_export(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let store = open_store(config)?;
    let path = output.unwrap_or_else(|| config.export_path());

    let count = store.export(&path)?;

    println!("✓ Exported {} secret(s) to {}", count, path.display());
    println!("  WARNING: this file contains every password in plaintext. Delete it when done.");
    Ok(())
}

// ─── Suggest ─────────────────────────────────────────────────────────────────

fn cmd_suggest(config: &Config, length: Option<usize>) -> Result<()> {
    let suggester = match length {
        Some(length) => Suggester::new(length),
        None => config.suggester(),
    };
    println!("{}", suggester.suggest());
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Resolve the key source and open the file-backed store.
fn open_store(config: &Config) -> Result<SecretStore<FileBackend>> {
    let provider = config.key_provider()?;
    let cipher = Cipher::from_provider(provider.as_ref())?;

    let store = SecretStore::open(FileBackend::new(config.store_path()), cipher)?
        .with_suggester(config.suggester())
        .protect(config.key_file());

    Ok(store)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::prompt::mock::{ScriptedPrompter, SUGGEST_KEY};
    use crate::error::SecretCliError;
    use crate::store::mock::MemoryBackend;
    use crate::store::StoreError;
    use crate::suggest::DEFAULT_LENGTH;

    fn setup_store() -> (SecretStore<MemoryBackend>, MemoryBackend) {
        let backend = MemoryBackend::new();
        let store = SecretStore::open(backend.clone(), Cipher::new(&[6u8; 32]).unwrap()).unwrap();
        (store, backend)
    }

    fn seeded_store() -> (SecretStore<MemoryBackend>, MemoryBackend) {
        let (mut store, backend) = setup_store();
        store
            .add(
                NewSecret::new("Bank", "p@ss1234")
                    .username("alice")
                    .website("bank.com"),
            )
            .unwrap();
        (store, backend)
    }

    fn password_at(store: &SecretStore<MemoryBackend>, index: usize) -> String {
        store.list()[index].password.as_ref().unwrap().to_string()
    }

    #[test]
    fn test_add_flow_collects_all_fields() {
        let (mut store, _) = setup_store();
        let mut prompter = ScriptedPrompter::new(&[
            "Bank",
            "alice",
            "p@ss1234",
            "checking account",
            "alice@example.com",
            "bank.com",
        ]);

        let index = add_secret(&mut store, &mut prompter).unwrap();
        assert_eq!(index, Some(0));

        let record = store.get(0).unwrap();
        assert_eq!(record.title, "Bank");
        assert_eq!(record.username, "alice");
        assert_eq!(record.note, "checking account");
        assert_eq!(record.email, "alice@example.com");
        assert_eq!(record.website, "bank.com");
        assert_eq!(password_at(&store, 0), "p@ss1234");
        assert!(prompter.prompts.contains(&PASSWORD_PROMPT.to_string()));
        assert!(prompter.printed("Secret added at index 0"));
    }

    #[test]
    fn test_add_flow_uses_suggestion_key() {
        let (mut store, _) = setup_store();
        let mut prompter = ScriptedPrompter::new(&["Mail", "bob", SUGGEST_KEY]);

        add_secret(&mut store, &mut prompter).unwrap();

        let password = password_at(&store, 0);
        assert_eq!(password.len(), DEFAULT_LENGTH);
        let alphabet = Suggester::alphabet();
        assert!(password.bytes().all(|b| alphabet.contains(&b)));
        // Optional fields hit end of input and stay empty.
        assert_eq!(store.get(0).unwrap().note, "");
    }

    #[test]
    fn test_add_flow_with_empty_title_fails_validation() {
        let (mut store, backend) = setup_store();
        let mut prompter = ScriptedPrompter::new(&["", "alice", "pw", "", "", ""]);

        let err = add_secret(&mut store, &mut prompter).unwrap_err();
        assert!(matches!(
            err,
            SecretCliError::Store(StoreError::Validation { field: "title", .. })
        ));
        assert_eq!(backend.persist_calls(), 0);
    }

    #[test]
    fn test_add_flow_aborted_before_password_adds_nothing() {
        let (mut store, backend) = setup_store();
        let mut prompter = ScriptedPrompter::new(&["Bank", "alice"]);

        assert_eq!(add_secret(&mut store, &mut prompter).unwrap(), None);
        assert!(store.is_empty());
        assert_eq!(backend.persist_calls(), 0);
    }

    #[test]
    fn test_edit_flow_saves_accumulated_changes() {
        let (mut store, backend) = seeded_store();
        let created_at = store.get(0).unwrap().created_at;
        let mut prompter = ScriptedPrompter::new(&[
            "2", "alice.smith", "3", "n3w-p@ss", "6", "online.bank.com", SAVE_CHOICE,
        ]);

        let outcome = edit_secret(&mut store, &mut prompter, 0).unwrap();
        assert_eq!(outcome, EditOutcome::Saved);

        let record = store.get(0).unwrap();
        assert_eq!(record.title, "Bank");
        assert_eq!(record.username, "alice.smith");
        assert_eq!(record.website, "online.bank.com");
        assert_eq!(record.created_at, created_at);
        assert!(record.updated_at.is_some());
        assert_eq!(password_at(&store, 0), "n3w-p@ss");
        assert_eq!(backend.records()[0].username, "alice.smith");
        assert!(prompter.printed("Editing secret: Bank"));
    }

    #[test]
    fn test_edit_flow_abandoned_at_end_of_input_saves_nothing() {
        let (mut store, backend) = seeded_store();
        let before = backend.records();
        let calls = backend.persist_calls();
        let mut prompter = ScriptedPrompter::new(&["1", "Renamed", "3", "changed"]);

        let outcome = edit_secret(&mut store, &mut prompter, 0).unwrap();
        assert_eq!(outcome, EditOutcome::Cancelled);
        assert_eq!(backend.persist_calls(), calls);
        assert_eq!(backend.records(), before);
        assert_eq!(store.get(0).unwrap().title, "Bank");
        assert_eq!(password_at(&store, 0), "p@ss1234");
    }

    #[test]
    fn test_edit_flow_explicit_cancel() {
        let (mut store, backend) = seeded_store();
        let calls = backend.persist_calls();
        let mut prompter = ScriptedPrompter::new(&["1", "Renamed", CANCEL_CHOICE]);

        let outcome = edit_secret(&mut store, &mut prompter, 0).unwrap();
        assert_eq!(outcome, EditOutcome::Cancelled);
        assert_eq!(backend.persist_calls(), calls);
        assert_eq!(store.get(0).unwrap().title, "Bank");
    }

    #[test]
    fn test_edit_flow_rejects_bad_choice_and_empty_title() {
        let (mut store, _) = seeded_store();
        let mut prompter = ScriptedPrompter::new(&["9", "abc", "1", "   ", SAVE_CHOICE]);

        edit_secret(&mut store, &mut prompter, 0).unwrap();
        assert!(prompter.printed("Invalid choice"));
        assert!(prompter.printed("Title must not be empty"));
        assert_eq!(store.get(0).unwrap().title, "Bank");
    }

    #[test]
    fn test_edit_flow_suggested_password() {
        let (mut store, _) = seeded_store();
        let mut prompter = ScriptedPrompter::new(&["3", SUGGEST_KEY, SAVE_CHOICE]);

        edit_secret(&mut store, &mut prompter, 0).unwrap();
        let password = password_at(&store, 0);
        assert_ne!(password, "p@ss1234");
        assert_eq!(password.len(), DEFAULT_LENGTH);
    }

    #[test]
    fn test_edit_flow_invalid_index_prompts_nothing() {
        let (mut store, backend) = seeded_store();
        let calls = backend.persist_calls();
        let mut prompter = ScriptedPrompter::new(&[SAVE_CHOICE]);

        let err = edit_secret(&mut store, &mut prompter, 5).unwrap_err();
        assert!(matches!(
            err,
            SecretCliError::Store(StoreError::IndexOutOfRange { op: "edit", index: 5, len: 1 })
        ));
        assert!(prompter.prompts.is_empty());
        assert_eq!(backend.persist_calls(), calls);
    }

    #[test]
    fn test_render_listing_marks_undecryptable_entries() {
        let backend = MemoryBackend::new();
        SecretStore::open(backend.clone(), Cipher::new(&[1u8; 32]).unwrap())
            .unwrap()
            .add(NewSecret::new("Foreign", "pw"))
            .unwrap();
        let mut store = SecretStore::open(backend, Cipher::new(&[6u8; 32]).unwrap()).unwrap();
        store
            .add(NewSecret::new("Mail", "m41l").email("me@mail.com"))
            .unwrap();

        let rendered = render_listing(&store.list());
        assert!(rendered.contains("Stored secrets (2):"));
        assert!(rendered.contains("[0] Foreign"));
        assert!(rendered.contains("<undecryptable:"));
        assert!(rendered.contains("[1] Mail"));
        assert!(rendered.contains("Password: m41l"));
        assert!(rendered.contains("Email:    me@mail.com"));
        assert!(!rendered.contains("Updated:"));
    }

    #[test]
    fn test_open_store_without_key_material_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_parts(Some(dir.path().to_path_buf()), None, None, None);
        assert!(matches!(
            open_store(&config),
            Err(SecretCliError::Enclave(crate::enclave::EnclaveError::KeyUnavailable(_)))
        ));
    }

    #[test]
    fn test_init_creates_key_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_parts(Some(dir.path().join("home")), None, None, None);

        cmd_init(&config).unwrap();
        let key = std::fs::read_to_string(config.key_file()).unwrap();

        cmd_init(&config).unwrap();
        assert_eq!(std::fs::read_to_string(config.key_file()).unwrap(), key);
    }

    #[test]
    fn test_export_refuses_store_and_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_parts(Some(dir.path().to_path_buf()), None, None, None);
        cmd_init(&config).unwrap();
        open_store(&config)
            .unwrap()
            .add(NewSecret::new("Bank", "p@ss1234"))
            .unwrap();
        let store_before = std::fs::read(config.store_path()).unwrap();
        let key_before = std::fs::read(config.key_file()).unwrap();

        for target in [config.store_path(), config.key_file().to_path_buf()] {
            assert!(matches!(
                cmd_export(&config, Some(target)),
                Err(SecretCliError::Store(StoreError::Validation { field: "output", .. }))
            ));
        }

        assert_eq!(std::fs::read(config.store_path()).unwrap(), store_before);
        assert_eq!(std::fs::read(config.key_file()).unwrap(), key_before);
        assert_eq!(open_store(&config).unwrap().len(), 1);
    }
}

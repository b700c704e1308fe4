//! Integration tests for document session flows
//!
//! Open, edit, save, save-as and close through the public `Session` API
//! against real files in a temporary directory.

use std::fs;

use lrd_editor::config::Config;
use lrd_editor::highlight::StyleTag;
use lrd_editor::session::{CloseDecision, CloseOutcome, SaveOutcome};
use lrd_editor::{Editable, Error, LanguageId, Session};

#[path = "../test_utils/mod.rs"]
mod test_utils;

use test_utils::{write_file, ScriptedPrompt};

fn session() -> Session {
    Session::new(&Config::default())
}

#[test]
fn test_new_session_has_one_untitled_document() {
    let session = session();
    assert_eq!(session.len(), 1);

    let doc = session.active();
    assert_eq!(doc.label(), "Untitled-1");
    assert_eq!(doc.language(), LanguageId::Python);
    assert!(!doc.is_modified());
    assert!(!doc.is_path_bound());
    assert!(doc.path().is_none());
}

#[test]
fn test_create_document_becomes_active() {
    let mut session = session();
    let handle = session.create_document(Some(LanguageId::Sql));
    assert_eq!(session.len(), 2);
    assert_eq!(session.active_handle(), handle);
    assert_eq!(session.active().language(), LanguageId::Sql);
    assert_eq!(session.active().label(), "Untitled-2");
}

#[test]
fn test_open_demo_py_highlighting() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "demo.py", "def f():\n    return 1  # ok");

    let mut session = session();
    let handle = session.open_document(&path).unwrap();
    let doc = session.document(handle).unwrap();
    assert_eq!(doc.language(), LanguageId::Python);
    assert!(!doc.is_modified());

    let highlighter = doc.highlighter();
    assert_eq!(highlighter.style_at(0, 0), Some(StyleTag::Keyword));
    assert_eq!(highlighter.style_at(0, 4), Some(StyleTag::Function));

    let second = "    return 1  # ok";
    let col = |needle: &str| second.find(needle).unwrap();
    assert_eq!(highlighter.style_at(1, col("return")), Some(StyleTag::Keyword));
    assert_eq!(highlighter.style_at(1, col("1")), Some(StyleTag::Number));
    assert_eq!(highlighter.style_at(1, col("# ok")), Some(StyleTag::Comment));
    assert_eq!(highlighter.style_at(1, col("# ok") + 3), Some(StyleTag::Comment));
}

#[test]
fn test_open_missing_file_leaves_session_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session();
    let active = session.active_handle();

    let result = session.open_document(&dir.path().join("absent.py"));
    assert!(matches!(result, Err(Error::FileIo { .. })));
    assert_eq!(session.len(), 1);
    assert_eq!(session.active_handle(), active);
}

#[test]
fn test_open_binary_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blob.py");
    fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let mut session = session();
    assert!(matches!(session.open_document(&path), Err(Error::FileIo { .. })));
    assert_eq!(session.len(), 1);
}

#[test]
fn test_open_same_file_twice_focuses_existing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "a.js", "let x = 1;");

    let mut session = session();
    let first = session.open_document(&path).unwrap();
    session.create_document(None);
    let second = session.open_document(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(session.len(), 3);
    assert_eq!(session.active_handle(), first);
}

#[test]
fn test_edit_and_save_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "notes.sql", "SELECT 1;");

    let mut session = session();
    let handle = session.open_document(&path).unwrap();
    session.editable(handle).unwrap().insert(9, "\nSELECT 2;").unwrap();
    assert!(session.document(handle).unwrap().is_modified());
    assert_eq!(session.document(handle).unwrap().label(), "notes.sql*");

    let mut prompt = ScriptedPrompt::new();
    let outcome = session.save_document(handle, &mut prompt).unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved(_)));
    assert!(prompt.save_asked.is_empty());
    assert!(!session.document(handle).unwrap().is_modified());
    assert_eq!(fs::read_to_string(&path).unwrap(), "SELECT 1;\nSELECT 2;");
}

#[test]
fn test_save_untitled_asks_for_path() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("script.sh");

    let mut session = session();
    let handle = session.active_handle();
    session.editable(handle).unwrap().replace_all("echo hi\n");

    let mut prompt = ScriptedPrompt::new().on_save(Some(target.clone()));
    let outcome = session.save_document(handle, &mut prompt).unwrap();
    assert_eq!(outcome, SaveOutcome::Saved(target.clone()));
    assert_eq!(prompt.save_asked, vec!["Untitled-1*".to_string()]);

    let doc = session.document(handle).unwrap();
    assert!(doc.is_path_bound());
    assert_eq!(doc.language(), LanguageId::Bash);
    assert_eq!(fs::read_to_string(&target).unwrap(), "echo hi\n");
}

#[test]
fn test_save_untitled_cancelled() {
    let mut session = session();
    let handle = session.active_handle();
    session.editable(handle).unwrap().replace_all("x = 1");

    let mut prompt = ScriptedPrompt::new().on_save(None);
    let outcome = session.save_document(handle, &mut prompt).unwrap();
    assert_eq!(outcome, SaveOutcome::Cancelled);
    assert!(session.active().is_modified());
    assert!(!session.active().is_path_bound());
}

#[test]
fn test_save_as_reinfers_language() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "page.txt", "<p>hi</p>");

    let mut session = session();
    let handle = session.open_document(&path).unwrap();
    assert_eq!(session.active().language(), LanguageId::Text);
    assert!(session.active().highlights().iter().all(|block| block.is_empty()));

    let html = dir.path().join("page.html");
    session.save_as_document(handle, &html).unwrap();

    let doc = session.document(handle).unwrap();
    assert_eq!(doc.language(), LanguageId::Html);
    assert_eq!(doc.label(), "page.html");
    assert!(!doc.highlights()[0].is_empty());
}

#[test]
fn test_failed_save_leaves_document_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session();
    let handle = session.active_handle();
    session.editable(handle).unwrap().replace_all("print(1)");

    let bad = dir.path().join("missing-dir").join("out.py");
    assert!(session.save_as_document(handle, &bad).is_err());

    let doc = session.document(handle).unwrap();
    assert!(doc.is_modified());
    assert!(doc.path().is_none());
    assert_eq!(doc.language(), LanguageId::Python);
    assert!(!bad.exists());
}

#[test]
fn test_close_unmodified_only_document_replaces_it() {
    let mut session = session();
    let original = session.active_handle();

    let mut prompt = ScriptedPrompt::new();
    let outcome = session.close_document(original, &mut prompt).unwrap();
    assert_eq!(outcome, CloseOutcome::Closed);
    assert!(prompt.close_asked.is_empty());

    assert_eq!(session.len(), 1);
    assert_ne!(session.active_handle(), original);
    assert_eq!(session.active().label(), "Untitled-2");
}

#[test]
fn test_close_cancel_keeps_both_documents() {
    let dir = tempfile::tempdir().unwrap();
    let first_path = write_file(dir.path(), "one.py", "a = 1\n");
    let second_path = write_file(dir.path(), "two.py", "b = 2\n");

    let mut session = Session::new(&Config::default());
    let untitled = session.active_handle();
    let mut prompt = ScriptedPrompt::new();
    session.close_document(untitled, &mut prompt).unwrap();

    let first = session.open_document(&first_path).unwrap();
    let second = session.open_document(&second_path).unwrap();
    let replacement = session
        .documents()
        .iter()
        .map(|doc| doc.handle())
        .find(|handle| *handle != first && *handle != second)
        .unwrap();
    session.close_document(replacement, &mut prompt).unwrap();
    assert_eq!(session.len(), 2);

    session.editable(second).unwrap().insert(0, "# edited\n").unwrap();
    let before: Vec<String> = session.documents().iter().map(|doc| doc.text().to_string()).collect();

    let mut prompt = ScriptedPrompt::new().on_close(CloseDecision::Cancel);
    let outcome = session.close_document(second, &mut prompt).unwrap();

    assert_eq!(outcome, CloseOutcome::Cancelled);
    assert_eq!(prompt.close_asked, vec!["two.py*".to_string()]);
    assert_eq!(session.len(), 2);
    let after: Vec<String> = session.documents().iter().map(|doc| doc.text().to_string()).collect();
    assert_eq!(before, after);
    assert!(session.document(second).unwrap().is_modified());
    assert_eq!(fs::read_to_string(&second_path).unwrap(), "b = 2\n");
}

#[test]
fn test_close_with_save_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "keep.css", "body {}");

    let mut session = session();
    let handle = session.open_document(&path).unwrap();
    session.editable(handle).unwrap().replace_all("p { color: red; }");

    let mut prompt = ScriptedPrompt::new().on_close(CloseDecision::Save);
    let outcome = session.close_document(handle, &mut prompt).unwrap();
    assert_eq!(outcome, CloseOutcome::Closed);
    assert!(session.document(handle).is_none());
    assert_eq!(fs::read_to_string(&path).unwrap(), "p { color: red; }");
}

#[test]
fn test_close_with_discard_drops_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "drop.java", "class A {}");

    let mut session = session();
    let handle = session.open_document(&path).unwrap();
    session.editable(handle).unwrap().replace_all("class B {}");

    let mut prompt = ScriptedPrompt::new().on_close(CloseDecision::Discard);
    assert_eq!(session.close_document(handle, &mut prompt).unwrap(), CloseOutcome::Closed);
    assert_eq!(fs::read_to_string(&path).unwrap(), "class A {}");
}

#[test]
fn test_close_save_of_untitled_cancelled_keeps_document() {
    let mut session = session();
    let handle = session.active_handle();
    session.editable(handle).unwrap().replace_all("draft");

    let mut prompt = ScriptedPrompt::new().on_close(CloseDecision::Save).on_save(None);
    let outcome = session.close_document(handle, &mut prompt).unwrap();
    assert_eq!(outcome, CloseOutcome::Cancelled);
    assert_eq!(session.active_handle(), handle);
    assert_eq!(session.active().text(), "draft");
}

#[test]
fn test_set_language_rehighlights() {
    let mut session = session();
    let handle = session.active_handle();
    session.editable(handle).unwrap().replace_all("SELECT name FROM users");
    assert_ne!(session.active().highlights()[0].style_at(0), Some(StyleTag::Keyword));

    session.set_language(handle, LanguageId::Sql).unwrap();
    assert_eq!(session.active().language(), LanguageId::Sql);
    assert_eq!(session.active().highlights()[0].style_at(0), Some(StyleTag::Keyword));
}

#[test]
fn test_auto_save_writes_only_bound_modified_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "auto.py", "x = 1\n");

    let mut session = session();
    let untitled = session.active_handle();
    session.editable(untitled).unwrap().replace_all("scratch");
    let bound = session.open_document(&path).unwrap();
    session.editable(bound).unwrap().replace_all("x = 2\n");

    let failures = session.auto_save();
    assert!(failures.is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "x = 2\n");
    assert!(!session.document(bound).unwrap().is_modified());
    assert!(session.document(untitled).unwrap().is_modified());
}

#[test]
fn test_tab_cycling_wraps() {
    let mut session = session();
    let first = session.active_handle();
    let second = session.create_document(None);
    let third = session.create_document(None);

    assert_eq!(session.next_document(), first);
    assert_eq!(session.next_document(), second);
    assert_eq!(session.previous_document(), first);
    assert_eq!(session.previous_document(), third);
}

#[test]
fn test_find_and_replace_through_editable() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "demo.py", "value = 1\nprint(value)\n");

    let mut session = session();
    let handle = session.open_document(&path).unwrap();
    let editable = session.editable(handle).unwrap();
    assert_eq!(editable.find("value", 0), Some(0..5));
    assert_eq!(editable.find("value", 1), Some(16..21));
    assert_eq!(editable.find("missing", 0), None);

    assert_eq!(editable.replace_all_matches("value", "def"), 2);
    assert_eq!(editable.text(), "def = 1\nprint(def)\n");

    let doc = session.document(handle).unwrap();
    assert!(doc.is_modified());
    assert_eq!(doc.label(), "demo.py*");
    assert_eq!(doc.highlights()[0].style_at(0), Some(StyleTag::Keyword));
    assert_eq!(fs::read_to_string(&path).unwrap(), "value = 1\nprint(value)\n");
}

#[test]
fn test_close_all_cancel_leaves_session_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "a.py", "a = 1\n");

    let mut session = session();
    let bound = session.open_document(&path).unwrap();
    session.editable(bound).unwrap().replace_all("a = 2\n");
    assert!(session.has_unsaved());

    let mut prompt = ScriptedPrompt::new().on_close(CloseDecision::Cancel);
    assert_eq!(session.close_all(&mut prompt).unwrap(), CloseOutcome::Cancelled);
    assert_eq!(prompt.close_all_asked, vec![vec!["a.py*".to_string()]]);
    assert_eq!(session.len(), 2);
    assert_eq!(session.active_handle(), bound);
    assert!(session.has_unsaved());
    assert_eq!(fs::read_to_string(&path).unwrap(), "a = 1\n");
}

#[test]
fn test_close_all_save_writes_every_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "a.py", "a = 1\n");
    let target = dir.path().join("draft.sh");

    let mut session = session();
    let untitled = session.active_handle();
    session.editable(untitled).unwrap().replace_all("echo draft\n");
    let bound = session.open_document(&path).unwrap();
    session.editable(bound).unwrap().replace_all("a = 2\n");

    let mut prompt = ScriptedPrompt::new()
        .on_close(CloseDecision::Save)
        .on_save(Some(target.clone()));
    assert_eq!(session.close_all(&mut prompt).unwrap(), CloseOutcome::Closed);

    assert_eq!(prompt.close_all_asked, vec![vec!["Untitled-1*".to_string(), "a.py*".to_string()]]);
    assert_eq!(prompt.save_asked, vec!["Untitled-1*".to_string()]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "a = 2\n");
    assert_eq!(fs::read_to_string(&target).unwrap(), "echo draft\n");

    assert_eq!(session.len(), 1);
    assert!(!session.has_unsaved());
    assert!(session.document(bound).is_none());
    assert!(session.document(untitled).is_none());
}

#[test]
fn test_close_all_save_cancelled_for_untitled_keeps_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "a.py", "a = 1\n");

    let mut session = session();
    let untitled = session.active_handle();
    session.editable(untitled).unwrap().replace_all("scratch");
    let bound = session.open_document(&path).unwrap();
    session.editable(bound).unwrap().replace_all("a = 2\n");

    let mut prompt = ScriptedPrompt::new().on_close(CloseDecision::Save).on_save(None);
    assert_eq!(session.close_all(&mut prompt).unwrap(), CloseOutcome::Cancelled);

    assert_eq!(session.len(), 2);
    assert!(session.document(untitled).unwrap().is_modified());
    assert!(!session.document(bound).unwrap().is_modified());
    assert_eq!(fs::read_to_string(&path).unwrap(), "a = 2\n");
}

#[test]
fn test_close_all_discard_keeps_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "a.py", "a = 1\n");

    let mut session = session();
    let bound = session.open_document(&path).unwrap();
    session.editable(bound).unwrap().replace_all("a = 2\n");

    let mut prompt = ScriptedPrompt::new().on_close(CloseDecision::Discard);
    assert_eq!(session.close_all(&mut prompt).unwrap(), CloseOutcome::Closed);
    assert_eq!(session.len(), 1);
    assert!(!session.has_unsaved());
    assert_eq!(fs::read_to_string(&path).unwrap(), "a = 1\n");
}

#[test]
fn test_save_as_onto_open_path_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "taken.py", "x = 1\n");

    let mut session = session();
    let untitled = session.active_handle();
    session.editable(untitled).unwrap().replace_all("y = 2\n");
    let owner = session.open_document(&path).unwrap();

    let result = session.save_as_document(untitled, &path);
    assert!(matches!(result, Err(Error::PathAlreadyOpen { .. })));
    assert_eq!(fs::read_to_string(&path).unwrap(), "x = 1\n");
    assert!(session.document(untitled).unwrap().path().is_none());
    assert!(session.document(untitled).unwrap().is_modified());

    let mut prompt = ScriptedPrompt::new().on_save(Some(dir.path().join("./taken.py")));
    assert!(session.save_document(untitled, &mut prompt).is_err());

    session.save_as_document(owner, &path).unwrap();
    assert_eq!(session.document(owner).unwrap().path(), Some(path.canonicalize().unwrap().as_path()));
}

use {
    agenda::{
        Agenda, ErrorKind, FilePreferences, MemoryPreferences, Person, PersonForm, StoreEvent,
    },
    std::{cell::RefCell, fs, rc::Rc},
    tempfile::TempDir,
};

fn contacts() -> Vec<Person> {
    let mut hans = Person::new("Hans", "Muster");
    hans.street = "Somestreet".to_owned();
    hans.postal_code = 1234;
    hans.city = "Somecity".to_owned();
    vec![hans, Person::new("Ruth", "Mueller"), Person::new("Heinz", "Kurz")]
}

fn saved_agenda(dir: &TempDir, name: &str) -> Agenda<MemoryPreferences> {
    let mut agenda = Agenda::new(MemoryPreferences::new());
    agenda.store_mut().replace_all(contacts());
    agenda.save_as(&dir.path().join(name)).unwrap();
    agenda
}

#[test]
fn open_replaces_store_and_sets_title() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("contacts.xml");
    saved_agenda(&dir, "contacts.xml");

    let mut agenda = Agenda::new(MemoryPreferences::new());
    agenda.store_mut().push(Person::new("Old", "Entry"));
    assert_eq!(agenda.title(), "AgendaApp");

    agenda.open(&path).unwrap();

    assert_eq!(agenda.store().persons(), contacts());
    assert_eq!(agenda.file_path(), Some(path.as_path()));
    assert_eq!(agenda.title(), "AgendaApp - contacts.xml");
    assert_eq!(agenda.persistence().last_path(), Some(path));
}

#[test]
fn malformed_file_leaves_state_unchanged() {
    let dir = TempDir::new().unwrap();
    let mut agenda = saved_agenda(&dir, "good.xml");
    let good = dir.path().join("good.xml");
    let bad = dir.path().join("bad.xml");
    fs::write(
        &bad,
        "<persons><person><firstName>Hans</firstName></person></persons>",
    )
    .unwrap();

    let error = agenda.open(&bad).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Malformed);
    assert_eq!(agenda.store().persons(), contacts());
    assert_eq!(agenda.file_path(), Some(good.as_path()));
    assert_eq!(agenda.persistence().last_path(), Some(good));
}

#[test]
fn unwritable_path_leaves_state_unchanged() {
    let dir = TempDir::new().unwrap();
    let mut agenda = saved_agenda(&dir, "good.xml");
    let good = dir.path().join("good.xml");
    let unwritable = dir.path().join("missing").join("a.xml");

    let error = agenda.save_as(&unwritable).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::WriteFailed);
    assert_eq!(agenda.store().persons(), contacts());
    assert_eq!(agenda.file_path(), Some(good.as_path()));
    assert_eq!(agenda.persistence().last_path(), Some(good));
}

#[test]
fn reopen_last_restores_previous_session() {
    let dir = TempDir::new().unwrap();
    let prefs_path = dir.path().join("prefs").join("preferences.json");
    let contacts_path = dir.path().join("contacts.xml");

    let mut first = Agenda::new(FilePreferences::open(&prefs_path).unwrap());
    first.store_mut().replace_all(contacts());
    first.save_as(&contacts_path).unwrap();
    drop(first);

    let mut second = Agenda::new(FilePreferences::open(&prefs_path).unwrap());
    let reopened = second.reopen_last().unwrap();

    assert_eq!(reopened, Some(contacts_path.clone()));
    assert_eq!(second.store().persons(), contacts());
    assert_eq!(second.file_path(), Some(contacts_path.as_path()));
}

#[test]
fn reopen_last_without_preference_does_nothing() {
    let mut agenda = Agenda::new(MemoryPreferences::new());
    assert_eq!(agenda.reopen_last().unwrap(), None);
    assert!(agenda.store().is_empty());
}

#[test]
fn reopen_last_reports_vanished_file() {
    let dir = TempDir::new().unwrap();
    let mut agenda = saved_agenda(&dir, "contacts.xml");
    fs::remove_file(dir.path().join("contacts.xml")).unwrap();

    let error = agenda.reopen_last().unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert_eq!(agenda.store().persons(), contacts());
}

#[test]
fn forget_clears_preference_and_current_file() {
    let dir = TempDir::new().unwrap();
    let mut agenda = saved_agenda(&dir, "contacts.xml");

    agenda.forget_last_path().unwrap();

    assert_eq!(agenda.persistence().last_path(), None);
    assert_eq!(agenda.file_path(), None);
    assert_eq!(agenda.title(), "AgendaApp");
    assert_eq!(agenda.reopen_last().unwrap(), None);
}

#[test]
fn new_document_keeps_last_path() {
    let dir = TempDir::new().unwrap();
    let mut agenda = saved_agenda(&dir, "contacts.xml");

    agenda.new_document();

    assert!(agenda.store().is_empty());
    assert_eq!(agenda.file_path(), None);
    assert_eq!(
        agenda.persistence().last_path(),
        Some(dir.path().join("contacts.xml"))
    );
}

#[test]
fn edited_person_is_saved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("contacts.xml");
    let mut agenda = saved_agenda(&dir, "contacts.xml");

    let mut form = PersonForm::from_person(&agenda.store().persons()[0]);
    form.city = "Bern".to_owned();
    form.birthday = "21.02.1999".to_owned();
    let edited = form.validate().unwrap();
    agenda.store_mut().set(0, edited.clone());
    agenda.save_as(&path).unwrap();

    let mut reloaded = Agenda::new(MemoryPreferences::new());
    reloaded.open(&path).unwrap();
    assert_eq!(reloaded.store().persons()[0], edited);
    assert_eq!(reloaded.store().len(), 3);
}

#[test]
fn observers_see_open() {
    let dir = TempDir::new().unwrap();
    saved_agenda(&dir, "contacts.xml");

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let mut agenda = Agenda::new(MemoryPreferences::new());
    agenda
        .store_mut()
        .subscribe(move |event, persons| sink.borrow_mut().push((event, persons.len())));

    agenda.open(&dir.path().join("contacts.xml")).unwrap();
    let _ = agenda.open(&dir.path().join("nope.xml"));

    assert_eq!(*events.borrow(), [(StoreEvent::Replaced, 3)]);
}

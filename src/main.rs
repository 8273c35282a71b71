use {
    agenda::{
        birthday_histogram, format_date, persons_to_json, persons_to_xml, window_title, Agenda,
        FilePreferences, PersistenceListener, Person, PersonForm,
    },
    anyhow::{bail, Context},
    args::{Args, Command, OutputFormat},
    clap::Parser,
    log::info,
    std::{
        io::{self, Write},
        path::Path,
    },
};

mod args;
mod config;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = config::obtain_config()?.unwrap_or_default();

    env_logger::init_from_env(
        env_logger::Env::new().default_filter_or(config.log_level.as_deref().unwrap_or("warn")),
    );

    let preferences_path = args.preferences_path(&config)?;
    let preferences =
        FilePreferences::open(&preferences_path).context("Failed to open preferences")?;

    let mut agenda = Agenda::new(preferences);
    agenda.persistence_mut().add_listener(TitleBar);

    run(&args, &mut agenda)
}

/// Stands in for a window title bar.
struct TitleBar;

impl PersistenceListener for TitleBar {
    fn file_opened(&mut self, path: &Path) {
        info!("{}", window_title(Some(path)));
    }

    fn file_saved(&mut self, path: &Path) {
        info!("{}", window_title(Some(path)));
    }
}

fn run(args: &Args, agenda: &mut Agenda<FilePreferences>) -> anyhow::Result<()> {
    match args.command() {
        Command::Open { path } => {
            agenda.open(path)?;
            println!("Opened {} ({} contacts)", path.display(), agenda.store().len());
        }
        Command::New { path } => {
            agenda.new_document();
            agenda.save_as(path)?;
            println!("Created {}", path.display());
        }
        Command::Forget => {
            agenda
                .forget_last_path()
                .context("Failed to update preferences")?;
            println!("No file will be reopened on startup");
        }
        Command::Status => {
            match agenda.persistence().last_path() {
                Some(path) => println!("Last file:   {}", path.display()),
                None => println!("Last file:   none"),
            }
            println!(
                "Preferences: {}",
                agenda.persistence().preferences().path().display()
            );
        }
        Command::List => {
            open_current(args, agenda)?;
            println!("{}", agenda.title());
            for (index, person) in agenda.store().persons().iter().enumerate() {
                println!("{:>4}  {person}", index + 1);
            }
        }
        Command::Show { number } => {
            open_current(args, agenda)?;
            let index = index_of(agenda, *number)?;
            if let Some(person) = agenda.store().get(index) {
                print_person(person);
            }
        }
        Command::Add(fields) => {
            open_current(args, agenda)?;
            let person = fields.to_form().validate()?;
            let index = agenda.store_mut().push(person);
            save_current(agenda)?;
            println!("Added contact {}", index + 1);
        }
        Command::Edit { number, fields } => {
            open_current(args, agenda)?;
            let index = index_of(agenda, *number)?;
            let mut form = match agenda.store().get(index) {
                Some(person) => PersonForm::from_person(person),
                None => bail!("There is no contact number {number}"),
            };
            fields.apply_to(&mut form);
            let person = form.validate()?;
            agenda.store_mut().set(index, person);
            save_current(agenda)?;
            println!("Updated contact {number}");
        }
        Command::Delete { number } => {
            open_current(args, agenda)?;
            let index = index_of(agenda, *number)?;
            if let Some(person) = agenda.store_mut().remove(index) {
                save_current(agenda)?;
                println!("Deleted {person}");
            }
        }
        Command::SaveAs { path } => {
            open_current(args, agenda)?;
            agenda.save_as(path)?;
            println!("Saved {} contacts to {}", agenda.store().len(), path.display());
        }
        Command::Stats => {
            open_current(args, agenda)?;
            for (month, count) in birthday_histogram(agenda.store().persons()) {
                println!("{:<10} {count:>3} {}", month.name(), "#".repeat(count));
            }
        }
        Command::Export { format } => {
            open_current(args, agenda)?;
            let mut stdout = io::stdout().lock();
            match format {
                OutputFormat::Xml => {
                    let xml = persons_to_xml(agenda.store().persons())
                        .context("Failed to export contacts as XML")?;
                    stdout.write_all(xml.as_bytes())?;
                }
                OutputFormat::Json => {
                    persons_to_json(&mut stdout, agenda.store().persons())
                        .context("Failed to export contacts as JSON")?;
                    writeln!(stdout)?;
                }
            }
        }
    }
    Ok(())
}

/// Load the file given with `--file`, or else the one used last.
fn open_current(args: &Args, agenda: &mut Agenda<FilePreferences>) -> anyhow::Result<()> {
    match args.file() {
        Some(path) => agenda.open(path)?,
        None => {
            let reopened = agenda
                .reopen_last()
                .context("Failed to reopen the last contact file")?;
            if reopened.is_none() {
                bail!("No contact file is open. Use `agenda open <FILE>` or `agenda new <FILE>`");
            }
        }
    }
    Ok(())
}

fn save_current(agenda: &mut Agenda<FilePreferences>) -> anyhow::Result<()> {
    let path = agenda
        .file_path()
        .context("No contact file is open")?
        .to_path_buf();
    agenda.save_as(&path)?;
    Ok(())
}

/// Turn a 1-based contact number into an index into the store.
fn index_of(agenda: &Agenda<FilePreferences>, number: usize) -> anyhow::Result<usize> {
    let len = agenda.store().len();
    if number == 0 || number > len {
        bail!("There is no contact number {number} ({len} contacts)");
    }
    Ok(number - 1)
}

fn print_person(person: &Person) {
    println!("First name:  {}", person.first_name);
    println!("Last name:   {}", person.last_name);
    println!("Street:      {}", person.street);
    println!("Postal code: {}", person.postal_code);
    println!("City:        {}", person.city);
    match &person.birthday {
        Some(birthday) => println!("Birthday:    {}", format_date(birthday)),
        None => println!("Birthday:    -"),
    }
}

use {
    crate::config::{self, Config},
    agenda::PersonForm,
    anyhow::{anyhow, bail},
    clap::{Args as ClapArgs, Parser, Subcommand},
    std::{path::PathBuf, str::FromStr},
};

/// Keep an address book in an XML file
#[derive(Debug, Parser)]
pub struct Args {
    #[command(subcommand)]
    command: Command,
    /// Work on this contact file instead of the one used last
    #[arg(short = 'f', long = "file", global = true)]
    file: Option<PathBuf>,
    /// Location of the preferences file
    #[arg(long = "preferences", global = true)]
    preferences_path: Option<PathBuf>,
}

impl Args {
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn file(&self) -> Option<&PathBuf> {
        self.file.as_ref()
    }

    pub fn preferences_path(&self, config: &Config) -> anyhow::Result<PathBuf> {
        self.preferences_path
            .clone()
            .or_else(|| config.preferences_path.clone())
            .or_else(config::default_preferences_path)
            .ok_or_else(|| anyhow!("Could not find a place for the preferences file"))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open a contact file and make it the current one
    Open { path: PathBuf },
    /// Start an empty contact list and save it to the given file
    New { path: PathBuf },
    /// List the names of all contacts
    List,
    /// Show all details of a contact
    Show {
        /// Position of the contact, as shown by `list`
        number: usize,
    },
    /// Add a contact
    Add(PersonFields),
    /// Change fields of a contact
    Edit {
        /// Position of the contact, as shown by `list`
        number: usize,
        #[command(flatten)]
        fields: OptionalPersonFields,
    },
    /// Delete a contact
    Delete {
        /// Position of the contact, as shown by `list`
        number: usize,
    },
    /// Save the contacts to another file and make it the current one
    SaveAs { path: PathBuf },
    /// Show how many birthdays fall into each month
    Stats,
    /// Output contacts to STDOUT in the given format (by default XML)
    Export {
        /// The format of the output (xml/json)
        #[arg(long = "fmt", default_value = "xml")]
        format: OutputFormat,
    },
    /// Stop reopening the last used file on startup
    Forget,
    /// Show the current file and where preferences are kept
    Status,
}

#[derive(Debug, ClapArgs)]
pub struct PersonFields {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    street: String,
    #[arg(long)]
    postal_code: String,
    #[arg(long)]
    city: String,
    /// Birthday as dd.mm.yyyy
    #[arg(long, default_value = "")]
    birthday: String,
}

impl PersonFields {
    pub fn to_form(&self) -> PersonForm {
        PersonForm {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            street: self.street.clone(),
            postal_code: self.postal_code.clone(),
            city: self.city.clone(),
            birthday: self.birthday.clone(),
        }
    }
}

#[derive(Debug, ClapArgs)]
pub struct OptionalPersonFields {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    street: Option<String>,
    #[arg(long)]
    postal_code: Option<String>,
    #[arg(long)]
    city: Option<String>,
    /// Birthday as dd.mm.yyyy, or an empty string to remove it
    #[arg(long)]
    birthday: Option<String>,
}

impl OptionalPersonFields {
    /// Overwrite the fields of `form` that were given on the command line.
    pub fn apply_to(&self, form: &mut PersonForm) {
        let fields = [
            (&self.first_name, &mut form.first_name),
            (&self.last_name, &mut form.last_name),
            (&self.street, &mut form.street),
            (&self.postal_code, &mut form.postal_code),
            (&self.city, &mut form.city),
            (&self.birthday, &mut form.birthday),
        ];
        for (given, field) in fields {
            if let Some(value) = given {
                value.clone_into(field);
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    Json,
    Xml,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;
    fn from_str(format: &str) -> anyhow::Result<Self> {
        Ok(match format.to_ascii_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "xml" => OutputFormat::Xml,
            _ => bail!("Invalid output format"),
        })
    }
}

//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Download, convert and browse examination reports.
///
/// Reports live under an upload directory with one folder per subject.
/// Word documents are converted to PDF with LibreOffice in the background.
#[derive(Parser, Debug)]
#[command(name = "exam-reports")]
#[command(author, version, about)]
pub struct Cli {
    /// Library root (overrides `upload_dir` from the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List catalog entries
    List(ListArgs),
    /// Convert every Word document that has no PDF yet
    Convert,
    /// List subjects on the report index site
    Subjects,
    /// Download every report for a subject
    Download(DownloadArgs),
    /// Copy local report files into the library
    Import(ImportArgs),
    /// Change an entry's subject, year or exam number
    Edit(EditArgs),
    /// Delete an entry and its converted PDF
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show this subject
    #[arg(long)]
    pub subject: Option<String>,

    /// Only show this year
    #[arg(long)]
    pub year: Option<String>,

    /// Print entries as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Subject name as listed by `subjects` (case-insensitive)
    pub subject: String,

    /// Skip converting downloaded Word documents
    #[arg(long)]
    pub no_convert: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Files to import (.pdf, .doc, .docx)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Skip converting imported Word documents
    #[arg(long)]
    pub no_convert: bool,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Source path of the entry
    pub path: PathBuf,

    /// New subject
    #[arg(long)]
    pub subject: Option<String>,

    /// New year
    #[arg(long)]
    pub year: Option<String>,

    /// New exam number, e.g. exam1
    #[arg(long)]
    pub exam: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Source path of the entry
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_subcommand() {
        let result = Cli::try_parse_from(["exam-reports"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let cli = Cli::try_parse_from(["exam-reports", "-vv", "list"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["exam-reports", "list", "--verbose"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_cli_quiet_and_upload_dir_are_global() {
        let cli = Cli::try_parse_from(["exam-reports", "convert", "-q", "--upload-dir", "lib"])
            .unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.upload_dir, Some(PathBuf::from("lib")));
        assert!(matches!(cli.command, Command::Convert));
    }

    #[test]
    fn test_cli_list_filters() {
        let cli = Cli::try_parse_from([
            "exam-reports",
            "list",
            "--subject",
            "Chemistry",
            "--year",
            "2023",
            "--json",
        ])
        .unwrap();
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.subject.as_deref(), Some("Chemistry"));
        assert_eq!(args.year.as_deref(), Some("2023"));
        assert!(args.json);
    }

    #[test]
    fn test_cli_download_takes_subject() {
        let cli = Cli::try_parse_from(["exam-reports", "download", "Chemistry", "--no-convert"])
            .unwrap();
        let Command::Download(args) = cli.command else {
            panic!("expected download");
        };
        assert_eq!(args.subject, "Chemistry");
        assert!(args.no_convert);
    }

    #[test]
    fn test_cli_import_requires_files() {
        assert!(Cli::try_parse_from(["exam-reports", "import"]).is_err());
        let cli = Cli::try_parse_from(["exam-reports", "import", "a.pdf", "b.docx"]).unwrap();
        let Command::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.files.len(), 2);
    }

    #[test]
    fn test_cli_edit_fields_optional() {
        let cli = Cli::try_parse_from(["exam-reports", "edit", "Chem/a.pdf", "--exam", "EXAM2"])
            .unwrap();
        let Command::Edit(args) = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(args.path, PathBuf::from("Chem/a.pdf"));
        assert!(args.subject.is_none());
        assert_eq!(args.exam.as_deref(), Some("EXAM2"));
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Cli::try_parse_from(["exam-reports", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}

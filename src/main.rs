use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Args, Parser, Subcommand};
use exam_sim::{
    load_manifest, load_question_set, preview, Exam, ExamConfig, ExamError, FileStore, PaperRef,
};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "EXAM_SIM_LOG";
const LOG_FILE_NAME: &str = "exam-sim.log";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding question sets and manifests
    #[arg(long, global = true, default_value = "questions")]
    questions_dir: PathBuf,

    /// Directory where attempts are autosaved
    #[arg(long, global = true, default_value = ".exam-sim")]
    save_dir: PathBuf,

    /// Log file (defaults to exam-sim.log in the save directory while an exam runs)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct PaperArgs {
    /// Exam key, e.g. jee_main
    #[arg(short, long)]
    exam: String,

    /// Paper year
    #[arg(short, long)]
    year: String,

    /// Explicit question-set file name inside the questions directory
    #[arg(short, long)]
    file: Option<String>,
}

impl PaperArgs {
    fn paper(&self) -> PaperRef {
        PaperRef::new(&self.exam, &self.year).with_file(self.file.clone())
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take (or resume) an exam
    Run {
        #[command(flatten)]
        paper: PaperArgs,

        /// Override the paper's duration, in minutes
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        duration_min: Option<u64>,
    },
    /// List the papers available for an exam
    List {
        /// Exam key, e.g. jee_main
        #[arg(short, long)]
        exam: String,
    },
    /// Show the first questions of a paper
    Preview {
        #[command(flatten)]
        paper: PaperArgs,

        /// Number of questions to show
        #[arg(short, long, default_value_t = 6)]
        count: usize,
    },
}

fn init_logging(log_file: Option<&Path>) -> io::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), ExamError> {
    match cli.command {
        Command::Run {
            paper,
            duration_min,
        } => {
            let mut config = ExamConfig::new(&cli.questions_dir, paper.paper());
            config.duration_seconds = duration_min.map(|minutes| minutes.saturating_mul(60));

            let exam = Exam::open(&config, Box::new(FileStore::new(&cli.save_dir)))?;
            match exam.run().await? {
                Some(score) => {
                    println!("Total:       {}", score.total);
                    println!("Answered:    {}", score.answered);
                    println!("Correct:     {}", score.correct);
                    println!("Wrong:       {}", score.wrong);
                    println!("Unattempted: {}", score.unattempted);
                    println!("Score:       {}", score.score);
                }
                None => println!("Progress saved. Run the same paper again to resume."),
            }
        }
        Command::List { exam } => {
            let manifest = load_manifest(&cli.questions_dir, &exam)?;
            println!("{}", manifest.exam.as_deref().unwrap_or(&exam));

            let mut years = manifest.available_years(&exam).peekable();
            if years.peek().is_none() {
                println!("  No years");
            }
            for year in years {
                let file = PaperRef::new(&exam, &year).file_name();
                println!("  {}  {}", year, file);
            }
        }
        Command::Preview { paper, count } => {
            let paper = paper.paper();
            let manifest = load_manifest(&cli.questions_dir, &paper.exam)?;
            paper.check_listed(&manifest)?;

            let set = load_question_set(paper.path_in(&cli.questions_dir))?;
            println!("Loaded {} — {}", paper.exam, paper.year);
            println!("Questions in file: {}", set.len());
            for text in preview(&set, count) {
                println!("  - {}", text);
            }
        }
    }
    Ok(())
}


#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let log_file = match (&cli.log_file, &cli.command) {
        (Some(path), _) => Some(path.clone()),
        (None, Command::Run { .. }) => Some(cli.save_dir.join(LOG_FILE_NAME)),
        (None, _) => None,
    };
    if let Err(e) = init_logging(log_file.as_deref()) {
        eprintln!("Failed to set up logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

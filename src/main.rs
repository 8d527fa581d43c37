use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use coverdoc::{CoverFields, Options, PageSize, SubmissionRequest, Upload};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PageSizeArg {
    Letter,
    A4,
}

impl From<PageSizeArg> for PageSize {
    fn from(arg: PageSizeArg) -> Self {
        match arg {
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::A4 => PageSize::A4,
        }
    }
}

/// Generate an assignment cover page, optionally followed by a converted DOCX.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Document to append after the cover (.docx).
    input: Option<PathBuf>,

    /// Output path. Defaults to the suggested submission file name.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the intermediate HTML of INPUT instead of a PDF.
    #[arg(long, requires = "input")]
    html: bool,

    #[arg(long, value_enum, default_value = "letter")]
    page_size: PageSizeArg,

    /// Body page margin in points.
    #[arg(long, default_value_t = 72.0)]
    margin: f32,

    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Logo image (PNG or JPEG) placed in the cover header.
    #[arg(long)]
    logo: Option<PathBuf>,

    #[arg(long, default_value = "")]
    assignment_no: String,
    #[arg(long, default_value = "")]
    course_code: String,
    #[arg(long, default_value = "")]
    course_title: String,
    #[arg(long, default_value = "")]
    assignment_name: String,
    #[arg(long, default_value = "")]
    submission_date: String,
    #[arg(long, default_value = "")]
    student_name: String,
    #[arg(long, default_value = "")]
    student_id: String,
    #[arg(long, default_value = "")]
    submitted_to: String,
}

impl Args {
    fn options(&self) -> Options {
        let options = Options::default()
            .with_page_size(self.page_size.into())
            .with_margin(self.margin)
            .with_render_timeout(Duration::from_secs(self.timeout_secs));
        match &self.logo {
            Some(path) => options.with_logo(path),
            None => options,
        }
    }

    fn fields(&self) -> CoverFields {
        CoverFields {
            assignment_no: self.assignment_no.clone(),
            course_code: self.course_code.clone(),
            course_title: self.course_title.clone(),
            assignment_name: self.assignment_name.clone(),
            submission_date: self.submission_date.clone(),
            student_name: self.student_name.clone(),
            student_id: self.student_id.clone(),
            submitted_to: self.submitted_to.clone(),
        }
    }
}

fn run(args: &Args) -> Result<PathBuf, coverdoc::Error> {
    let upload = match &args.input {
        Some(path) => Some(Upload {
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            bytes: std::fs::read(path)?,
        }),
        None => None,
    };

    if args.html
        && let Some(upload) = &upload
    {
        let html = coverdoc::convert_docx_to_html(&upload.bytes)?;
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&upload.filename).with_extension("html"));
        std::fs::write(&output, html)?;
        return Ok(output);
    }

    let request = SubmissionRequest {
        fields: args.fields(),
        upload,
    };
    let submission = coverdoc::build_submission(&request, &args.options())?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(submission.filename));
    std::fs::write(&output, &submission.bytes)?;
    Ok(output)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(output) => {
            println!("Wrote {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

//! Build a tall webcomic strip from a JSON layout and cut it into
//! numbered, upload-sized slices.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use panelstrip_io::{BuildReport, build_layout_file, default_slice_dir, slice_file};
use panelstrip_pipeline::{Layout, SliceParams};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Compose webcomic panels onto a tall canvas and slice it for upload.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Increase log detail (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compose the layout and write the finished canvas.
    Build(BuildArgs),
    /// Cut an existing image into numbered horizontal slices.
    Slice(SliceArgs),
    /// Build, then slice the exported canvas.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct BuildArgs {
    /// Layout document. Relative paths are taken from `--root`.
    #[arg(long, default_value = Layout::DEFAULT_LAYOUT_FILE)]
    layout: PathBuf,

    /// Directory that relative paths in the layout are resolved against.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Write the canvas here instead of the layout's export file.
    /// The format follows the extension (png, jpg/jpeg, webp).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct SliceOptions {
    /// Directory for the slices [default: `slices` next to the input].
    #[arg(long)]
    outdir: Option<PathBuf>,

    /// Height of each slice in pixels.
    #[arg(long, default_value_t = SliceParams::DEFAULT_SLICE_HEIGHT)]
    slice_height: u32,

    /// Rows repeated at the top of each following slice.
    #[arg(long, default_value_t = SliceParams::DEFAULT_OVERLAP)]
    overlap: u32,

    /// Remove existing PNG files from the output directory first.
    #[arg(long)]
    clean: bool,
}

impl SliceOptions {
    fn params(&self) -> anyhow::Result<SliceParams> {
        SliceParams::new(self.slice_height, self.overlap).context("invalid slice options")
    }

    fn run(&self, input: &Path, params: SliceParams) -> anyhow::Result<()> {
        let out_dir = self
            .outdir
            .clone()
            .unwrap_or_else(|| default_slice_dir(input));
        tracing::debug!(
            input = %input.display(),
            outdir = %out_dir.display(),
            slice_height = params.slice_height(),
            overlap = params.overlap(),
            clean = self.clean,
            "slicing"
        );
        slice_file(input, &out_dir, params, self.clean)
            .with_context(|| format!("slicing {}", input.display()))?;
        Ok(())
    }
}

#[derive(Debug, Args)]
struct SliceArgs {
    /// Image to slice.
    #[arg(short, long)]
    input: PathBuf,

    #[command(flatten)]
    options: SliceOptions,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    build: BuildArgs,

    #[command(flatten)]
    slice: SliceOptions,
}

impl BuildArgs {
    fn run(&self) -> anyhow::Result<BuildReport> {
        let layout = self.root.join(&self.layout);
        tracing::debug!(
            layout = %layout.display(),
            root = %self.root.display(),
            output = ?self.output,
            "building"
        );
        build_layout_file(&layout, &self.root, self.output.as_deref())
            .with_context(|| format!("building {}", layout.display()))
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build(args) => {
            args.run()?;
        }
        Command::Slice(args) => {
            let params = args.options.params()?;
            args.options.run(&args.input, params)?;
        }
        Command::Run(args) => {
            // Reject bad slice options before spending time on the build.
            let params = args.slice.params()?;
            let report = args.build.run()?;
            args.slice.run(&report.output, params)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn build_defaults() {
        let cli = Cli::try_parse_from(["panelstrip", "build"]).unwrap();
        let Command::Build(args) = cli.command else {
            unreachable!("expected build");
        };
        assert_eq!(args.layout, PathBuf::from("layout.json"));
        assert_eq!(args.root, PathBuf::from("."));
        assert_eq!(args.output, None);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn slice_defaults() {
        let cli = Cli::try_parse_from(["panelstrip", "slice", "--input", "strip.png"]).unwrap();
        let Command::Slice(args) = cli.command else {
            unreachable!("expected slice");
        };
        assert_eq!(args.input, PathBuf::from("strip.png"));
        assert_eq!(args.options.slice_height, 1200);
        assert_eq!(args.options.overlap, 0);
        assert!(!args.options.clean);
        assert_eq!(args.options.outdir, None);
        assert_eq!(args.options.params().unwrap(), SliceParams::default());
    }

    #[test]
    fn slice_requires_input() {
        assert!(Cli::try_parse_from(["panelstrip", "slice"]).is_err());
    }

    #[test]
    fn negative_overlap_is_rejected_by_parser() {
        let result = Cli::try_parse_from([
            "panelstrip",
            "slice",
            "--input",
            "a.png",
            "--overlap",
            "-5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn overlap_not_below_height_is_rejected() {
        let cli = Cli::try_parse_from([
            "panelstrip",
            "slice",
            "--input",
            "a.png",
            "--slice-height",
            "100",
            "--overlap",
            "100",
        ])
        .unwrap();
        let Command::Slice(args) = cli.command else {
            unreachable!("expected slice");
        };
        assert!(args.options.params().is_err());
    }

    #[test]
    fn run_accepts_build_and_slice_flags() {
        let cli = Cli::try_parse_from([
            "panelstrip",
            "-vv",
            "run",
            "--root",
            "comic",
            "--output",
            "out/strip.png",
            "--slice-height",
            "800",
            "--overlap",
            "50",
            "--outdir",
            "upload",
            "--clean",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Run(args) = cli.command else {
            unreachable!("expected run");
        };
        assert_eq!(args.build.root, PathBuf::from("comic"));
        assert_eq!(args.build.output, Some(PathBuf::from("out/strip.png")));
        assert_eq!(args.slice.params().unwrap().step(), 750);
        assert_eq!(args.slice.outdir, Some(PathBuf::from("upload")));
        assert!(args.slice.clean);
    }

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn run_logs_resolved_paths_at_debug() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(
            root.join("layout.json"),
            r#"{"canvas": {"width": 4, "height": 10}, "export": {"file": "strip.png"}}"#,
        )
        .unwrap();
        let cli = Cli::try_parse_from([
            "panelstrip",
            "run",
            "--root",
            root.to_str().unwrap(),
            "--slice-height",
            "5",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            unreachable!("expected run");
        };

        let logs = CapturedLogs::default();
        let subscriber = fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let params = args.slice.params().unwrap();
            let report = args.build.run().unwrap();
            args.slice.run(&report.output, params).unwrap();
        });

        let text = logs.text();
        assert!(text.contains("building"), "{text}");
        assert!(text.contains("layout.json"), "{text}");
        assert!(text.contains("slicing"), "{text}");
        assert!(text.contains("slices"), "{text}");
        assert!(text.contains("Saved:"), "{text}");
    }

    #[test]
    fn build_and_slice_from_cli_args() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(
            root.join("layout.json"),
            r#"{"canvas": {"width": 20, "height": 50}, "export": {"file": "out/strip.png"}}"#,
        )
        .unwrap();
        let root_arg = root.to_str().unwrap();

        let cli = Cli::try_parse_from([
            "panelstrip",
            "run",
            "--root",
            root_arg,
            "--slice-height",
            "20",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            unreachable!("expected run");
        };
        let params = args.slice.params().unwrap();
        let report = args.build.run().unwrap();
        args.slice.run(&report.output, params).unwrap();

        for name in ["001.png", "002.png", "003.png"] {
            assert!(root.join("out/slices").join(name).exists(), "{name}");
        }
    }
}

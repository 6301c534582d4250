//! Per-profile render jobs and their concurrent dispatch
//!
//! Each requested page-size profile becomes one independent job owning a
//! private document canvas; jobs share only read-only inputs (card texts,
//! font metrics) and are dispatched across the rayon pool. A failing job
//! never aborts its siblings: completed work is kept and the aggregate
//! report lists the failures.

use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, error, info, info_span};

use crate::background::{self, BackgroundCycle};
use crate::canvas::Canvas;
use crate::config::{Config, PageProfile};
use crate::error::{CardError, Result};
use crate::font::TtfFontMetrics;
use crate::grid::GridSpec;
use crate::pdf::PdfCanvas;
use crate::render::render_document;
use crate::style::CardStyle;

/// Everything one profile's render needs, copied out of the configuration
/// before dispatch; no shared mutable state with sibling jobs.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub profile: PageProfile,
    pub grid: GridSpec,
    pub style: CardStyle,
    pub items: Arc<Vec<String>>,
    pub backgrounds: Vec<PathBuf>,
    pub line_spacing: f32,
    pub output_path: PathBuf,
}

impl RenderJob {
    /// Assemble the job for one profile from the validated configuration
    pub fn from_config(
        config: &Config,
        profile: PageProfile,
        items: Arc<Vec<String>>,
        custom_name: Option<&str>,
    ) -> Result<Self> {
        let grid = config.grid_spec();
        // Fail before dispatch when this profile's cells cannot hold the
        // grid or its padding
        grid.validate()?;
        let (cell_w, cell_h) = grid.cell_size(&profile)?;
        if cell_w - 2.0 * grid.padding_mm <= 0.0 || cell_h - 2.0 * grid.padding_mm <= 0.0 {
            return Err(CardError::Config(format!(
                "padding {} mm leaves no drawable area in the {:.1} x {:.1} mm cells of page '{}'",
                grid.padding_mm, cell_w, cell_h, profile.key
            )));
        }
        let output_path = config.output_path(&profile.key, custom_name);
        Ok(Self {
            profile,
            grid,
            style: config.style()?,
            items,
            backgrounds: config.backgrounds.clone(),
            line_spacing: config.line_spacing,
            output_path,
        })
    }
}

/// Lifecycle of one job, reported through tracing events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Building,
    Writing,
    Done,
    Failed,
}

/// Terminal result of one job
#[derive(Debug)]
pub struct JobOutcome {
    pub profile_key: String,
    pub result: Result<PathBuf>,
}

/// Aggregate result of a whole run
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<JobOutcome>,
}

impl RunReport {
    pub fn succeeded_keys(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.profile_key.as_str())
            .collect()
    }

    pub fn failed_keys(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.profile_key.as_str())
            .collect()
    }

    /// True when jobs ran and none produced an output
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.result.is_err())
    }
}

/// Run one job to completion, never panicking across the pool boundary
pub fn run_job(job: &RenderJob, metrics: Arc<TtfFontMetrics>) -> JobOutcome {
    let span = info_span!("render_job", profile = %job.profile.key);
    let _guard = span.enter();
    debug!(state = ?JobState::Pending, cards = job.items.len(), "job queued");

    let result = execute(job, metrics);
    match &result {
        Ok(path) => {
            info!(state = ?JobState::Done, output = %path.display(), "job finished")
        }
        Err(e) => error!(state = ?JobState::Failed, error = %e, "job failed"),
    }

    JobOutcome {
        profile_key: job.profile.key.clone(),
        result,
    }
}

fn execute(job: &RenderJob, metrics: Arc<TtfFontMetrics>) -> Result<PathBuf> {
    debug!(state = ?JobState::Building, "building document");
    let mut canvas = PdfCanvas::new(&job.profile, metrics)?;

    // Composite each configured background once for this job; cells then
    // reuse the registered resources through the cycle.
    let mut handles = Vec::with_capacity(job.backgrounds.len());
    for path in &job.backgrounds {
        let composited = background::composite(path, job.style.background_alpha)?;
        handles.push(canvas.register_image(&composited)?);
    }
    let cycle = BackgroundCycle::new(handles)?;

    render_document(
        &mut canvas,
        &job.profile,
        &job.grid,
        &job.items,
        &cycle,
        &job.style,
        job.line_spacing,
    )?;

    debug!(state = ?JobState::Writing, output = %job.output_path.display(), "writing document");
    canvas.save(&job.output_path)?;
    Ok(job.output_path.clone())
}

/// Dispatch all jobs across the rayon pool and collect every outcome
pub fn run_all(jobs: &[RenderJob], metrics: Arc<TtfFontMetrics>) -> RunReport {
    let outcomes = jobs
        .par_iter()
        .map(|job| run_job(job, Arc::clone(&metrics)))
        .collect();
    RunReport { outcomes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::testing::load_test_font;
    use std::path::Path;

    struct Scratch {
        dir: PathBuf,
    }

    impl Scratch {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!(
                "cardgrid-{name}-{}",
                std::process::id()
            ));
            std::fs::create_dir_all(&dir).unwrap();
            Self { dir }
        }

        fn path(&self, file: &str) -> PathBuf {
            self.dir.join(file)
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.dir).ok();
        }
    }

    fn write_background(path: &Path) {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([120, 80, 200, 255]));
        img.save(path).unwrap();
    }

    fn job(
        profile: PageProfile,
        items: Arc<Vec<String>>,
        background: PathBuf,
        output: PathBuf,
    ) -> RenderJob {
        RenderJob {
            profile,
            grid: GridSpec {
                rows: 3,
                cols: 3,
                padding_mm: 5.0,
                spacing_mm: 5.0,
            },
            style: CardStyle::default(),
            items,
            backgrounds: vec![background],
            line_spacing: 1.2,
            output_path: output,
        }
    }

    #[test]
    fn test_run_job_writes_a_document() {
        let Some(font_data) = load_test_font() else {
            eprintln!("Skipping test: no system font found");
            return;
        };
        let scratch = Scratch::new("runjob");
        let bg = scratch.path("bg.png");
        write_background(&bg);

        let metrics = Arc::new(TtfFontMetrics::new(font_data).unwrap());
        let items = Arc::new(vec!["I am focused".to_string(), "I am kind".to_string()]);
        let out = scratch.path("card_letter.pdf");
        let outcome = run_job(
            &job(PageProfile::new("letter", 216.0, 279.0, 18.0), items, bg, out.clone()),
            metrics,
        );
        assert!(outcome.result.is_ok());
        assert!(out.is_file());
        let loaded = lopdf::Document::load(&out).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);
    }

    #[test]
    fn test_failed_sibling_does_not_abort_the_run() {
        let Some(font_data) = load_test_font() else {
            return;
        };
        let scratch = Scratch::new("siblings");
        let bg = scratch.path("bg.png");
        write_background(&bg);

        let metrics = Arc::new(TtfFontMetrics::new(font_data).unwrap());
        let items = Arc::new(vec!["still standing".to_string()]);
        let jobs = vec![
            job(
                PageProfile::new("a4", 210.0, 297.0, 24.0),
                Arc::clone(&items),
                scratch.path("missing.png"),
                scratch.path("card_a4.pdf"),
            ),
            job(
                PageProfile::new("letter", 216.0, 279.0, 18.0),
                Arc::clone(&items),
                bg,
                scratch.path("card_letter.pdf"),
            ),
        ];

        let report = run_all(&jobs, metrics);
        assert_eq!(report.failed_keys(), vec!["a4"]);
        assert_eq!(report.succeeded_keys(), vec!["letter"]);
        assert!(!report.all_failed());
        assert!(scratch.path("card_letter.pdf").is_file());
        assert!(!scratch.path("card_a4.pdf").exists());
    }

    #[test]
    fn test_all_failed_report() {
        let Some(font_data) = load_test_font() else {
            return;
        };
        let scratch = Scratch::new("allfail");
        let metrics = Arc::new(TtfFontMetrics::new(font_data).unwrap());
        let items = Arc::new(vec!["unused".to_string()]);
        let jobs = vec![job(
            PageProfile::new("letter", 216.0, 279.0, 18.0),
            items,
            scratch.path("missing.png"),
            scratch.path("card_letter.pdf"),
        )];
        let report = run_all(&jobs, metrics);
        assert!(report.all_failed());
    }

    #[test]
    fn test_from_config_rejects_impossible_grid() {
        let config = Config {
            backgrounds: vec![PathBuf::from("bg.png")],
            spacing_mm: 200.0,
            ..Config::default()
        };
        let result = RenderJob::from_config(
            &config,
            PageProfile::new("a4", 210.0, 297.0, 24.0),
            Arc::new(vec![]),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config_rejects_oversized_padding() {
        // 3x3 letter cells are about 68.7 x 89.7 mm, so 40 mm padding on
        // each side leaves nothing to draw in
        let config = Config {
            backgrounds: vec![PathBuf::from("bg.png")],
            padding_mm: 40.0,
            ..Config::default()
        };
        let result = RenderJob::from_config(
            &config,
            PageProfile::new("letter", 216.0, 279.0, 18.0),
            Arc::new(vec![]),
            None,
        );
        assert!(matches!(result, Err(CardError::Config(_))));
    }

    #[test]
    fn test_from_config_rejects_degenerate_grid() {
        let config = Config {
            backgrounds: vec![PathBuf::from("bg.png")],
            grid: crate::config::GridDef { rows: 0, cols: 3 },
            ..Config::default()
        };
        let result = RenderJob::from_config(
            &config,
            PageProfile::new("letter", 216.0, 279.0, 18.0),
            Arc::new(vec![]),
            None,
        );
        assert!(matches!(result, Err(CardError::Config(_))));
    }
}

use indicatif::{ProgressBar, ProgressStyle};

/// Per-file batch progress. Hidden (all calls become no-ops) when the run is
/// not interactive, so scripted batches stay silent.
pub fn batch_bar(interactive: bool, total: u64) -> ProgressBar {
    if !interactive {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  {spinner:.cyan} [{bar:40}] {pos}/{len} {msg}")
            .expect("invalid template")
            .progress_chars("=> "),
    );
    bar
}

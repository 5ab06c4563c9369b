/// Default command: list clusters matching the positional arguments.
use crate::cli::output::write_report;
use crate::cli::{Cli, OutputCtx};
use crate::cluster::{
    ClusterError, Report, ReportOptions, build_report, expand_selection, resolve_selection,
};
use crate::provider::{ClusterProvider, FsProvider, Layout};

/// Run `pg_lsclusters`.
///
/// # Errors
///
/// Returns `ClusterError` on invalid arguments, a missing cluster, unreadable
/// configuration, or failure to write the output.
pub fn run(cli: &Cli, ctx: &OutputCtx) -> Result<(), ClusterError> {
    let layout = Layout::from_env();
    tracing::debug!(conf_root = %layout.conf_root.display(), bin_root = %layout.bin_root.display(), "using layout");
    let provider = FsProvider::new(layout);

    let opts = ReportOptions {
        show_start: cli.start_conf,
    };
    let report = collect(
        cli.target.as_deref(),
        cli.cluster.as_deref(),
        &provider,
        provider.layout(),
        opts,
        ctx,
    )?;

    let _t_render = ctx.timer("render");
    write_report(&report, ctx)
}

/// Resolve the selection and build every row before anything is printed.
///
/// # Errors
///
/// Same as [`run`], minus output failures.
pub fn collect(
    target: Option<&str>,
    cluster: Option<&str>,
    provider: &dyn ClusterProvider,
    layout: &Layout,
    opts: ReportOptions,
    ctx: &OutputCtx,
) -> Result<Report, ClusterError> {
    let t_select = ctx.timer("select");
    let selection = resolve_selection(target, cluster)?;
    let targets = expand_selection(&selection, provider)?;
    drop(t_select);
    tracing::debug!(?selection, clusters = targets.len(), "resolved selection");

    let _t_build = ctx.timer("build_report");
    build_report(&targets, provider, layout, opts)
}

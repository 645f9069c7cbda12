//! Seed component resolution.

use crate::context::RunContext;
use crate::domain::{Component, ComponentTypes, SeedSet};
use crate::error::{Error, Result};
use refgraph_query::soql::{Condition, SoqlQuery};
use tracing::{debug, info};

/// Build the component query for `target_type`, optionally filtered by a
/// name substring.
pub fn component_query(target_type: &str, pattern: Option<&str>) -> SoqlQuery {
    let query = SoqlQuery::select(["Id", "Name"], target_type);
    match pattern {
        Some(p) => query.filter(Condition::contains("Name", p)),
        None => query,
    }
}

/// Resolve the ids of all components of the target type whose name contains
/// `pattern` (all components when `pattern` is `None` or empty).
///
/// The platform's `LIKE` ignores case, so returned rows are filtered again
/// with a case-sensitive substring test.
///
/// # Errors
///
/// - `Error::NoResults` if nothing matches
/// - `Error::RemoteQuery` if the query fails or a row lacks `Id`/`Name`
pub async fn resolve_seed_components(
    ctx: &RunContext<'_>,
    types: &ComponentTypes,
    pattern: Option<&str>,
) -> Result<SeedSet> {
    let pattern = pattern.filter(|p| !p.is_empty());

    ctx.reporter().progress(&format!(
        "Querying {} components{}",
        types.target,
        pattern
            .map(|p| format!(" with pattern '{p}'"))
            .unwrap_or_default()
    ));

    let soql = component_query(&types.target, pattern).to_soql();
    let result = ctx.client().query(&soql).await?;
    let components: Vec<Component> = result.decode()?;
    let returned = components.len();

    let seeds: SeedSet = components
        .into_iter()
        .filter(|c| pattern.is_none_or(|p| c.name.contains(p)))
        .map(|c| c.id)
        .collect();

    debug!(returned, kept = seeds.len(), "Filtered component rows");

    if seeds.is_empty() {
        return Err(Error::NoResults {
            component_type: types.target.clone(),
            pattern: pattern.map(str::to_string),
        });
    }

    info!(count = seeds.len(), component_type = %types.target, "Resolved seed components");
    Ok(seeds)
}

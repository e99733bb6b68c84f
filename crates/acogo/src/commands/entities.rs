//! Entity listing.

use serde::Serialize;
use tabled::Tabled;

use acogo_core::{Entity, EntityState, Platform, Session, entity};

use crate::cli::{EntitiesArgs, GlobalOpts, PlatformArg};
use crate::error::CliError;
use crate::output;

/// Serializable view of one entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub unique_id: String,
    pub platform: Platform,
    pub name: String,
    pub device: String,
    pub available: bool,
    pub state: EntityState,
}

impl From<&Entity> for EntityView {
    fn from(e: &Entity) -> Self {
        Self {
            unique_id: e.unique_id().to_owned(),
            platform: e.platform(),
            name: e.name().to_owned(),
            device: e.device_name().to_owned(),
            available: e.available(),
            state: e.state(),
        }
    }
}

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Platform")]
    platform: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "State")]
    state: String,
}

fn row(v: &EntityView, color: bool) -> EntityRow {
    EntityRow {
        id: v.unique_id.clone(),
        platform: v.platform.to_string(),
        name: v.name.clone(),
        device: v.device.clone(),
        state: output::paint_state(v.state, color),
    }
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Button => Self::Button,
            PlatformArg::Cover => Self::Cover,
            PlatformArg::BinarySensor => Self::BinarySensor,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: &EntitiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let wanted = args.platform.map(Platform::from);
    let views: Vec<EntityView> = entity::setup_entities(session)
        .await
        .iter()
        .filter(|e| wanted.is_none_or(|p| e.platform() == p))
        .map(EntityView::from)
        .collect();

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &views,
        |v| row(v, color),
        |v| v.unique_id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

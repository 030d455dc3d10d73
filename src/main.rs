mod actions;
mod counter;
mod render;
mod tile;

use streamdeck_lib::prelude::*;
use tracing::info;

use actions::stat::StatAction;

pub const PLUGIN_ID: &str = "icu.veelume.stattile";

fn main() -> anyhow::Result<()> {
    let _guard = init(PLUGIN_ID);
    info!("Starting V's Stat Tile Stream Deck plugin");

    let plugin = Plugin::new().add_action(ActionFactory::default_of::<StatAction>());

    run_plugin(plugin)
}

pub mod stat;

pub mod ids {
    use crate::PLUGIN_ID;

    pub const STAT: &str = const_format::concatcp!(PLUGIN_ID, ".stat");
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::ids;
    use crate::PLUGIN_ID;

    const MANIFEST: &str = include_str!("../../icu.veelume.stattile.sdPlugin/manifest.json");

    #[test]
    fn manifest_declares_every_action() {
        let manifest: Value = serde_json::from_str(MANIFEST).unwrap();
        assert_eq!(manifest["UUID"], PLUGIN_ID);
        let uuids: Vec<&str> = manifest["Actions"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|a| a["UUID"].as_str())
            .collect();
        assert_eq!(uuids, [ids::STAT]);
    }
}

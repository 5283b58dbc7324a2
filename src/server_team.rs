//! FTB Teams descriptor for the server team
//!
//! Server-owned OpenPaC claims need a server team to belong to on the FTB
//! side. The descriptor is fixed; nothing in it comes from the input.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Team id FTB Teams uses for the server team
pub const SERVER_TEAM_ID: &str = "30be7d9a-1adb-4a32-b0f0-50fdde3c0dc6";

/// Descriptor template, revision 1
pub const SERVER_TEAM_SNBT: &str = r##"{
	id: "30be7d9a-1adb-4a32-b0f0-50fdde3c0dc6"
	type: "server"
	ranks: { }
	properties: {
		"ftbteams:display_name": "Server"
		"ftbteams:description": ""
		"ftbteams:color": "#5555FF"
		"ftbteams:free_to_join": false
		"ftbteams:max_msg_history_size": 500
		"ftbchunks:allow_all_fake_players": false
		"ftbchunks:allow_named_fake_players": [ ]
		"ftbchunks:allow_fake_player_ids": true
		"ftbchunks:block_edit_and_interact_mode": "allies"
		"ftbchunks:block_edit_mode": "allies"
		"ftbchunks:block_interact_mode": "allies"
		"ftbchunks:entity_interact_mode": "allies"
		"ftbchunks:nonliving_entity_attack_mode": "allies"
		"ftbchunks:allow_explosions": false
		"ftbchunks:allow_mob_griefing": false
		"ftbchunks:claim_visibility": "public"
		"ftbchunks:location_mode": "allies"
		"ftbchunks:allow_pvp": true
	}
	extra: { }
	messages: [ ]
}
"##;

/// `<output>/ftbteams/server/<SERVER_TEAM_ID>.snbt`
pub fn server_team_path(output: &Path) -> PathBuf {
    output
        .join("ftbteams")
        .join("server")
        .join(format!("{}.snbt", SERVER_TEAM_ID))
}

/// Write the server team descriptor below `output`
pub fn write_server_team(output: &Path) -> Result<PathBuf> {
    let path = server_team_path(output);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(&path)?;
    file.write_all(SERVER_TEAM_SNBT.as_bytes())?;
    Ok(path)
}

use serde::Serialize;

/// Map metadata shown in the server browser
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MapInfo {
    pub author: Option<String>,
    pub map_version: Option<String>,
    pub credits: Option<String>,
    pub license: Option<String>,
    /// Server commands executed on map load
    pub settings: Vec<String>,
}

impl MapInfo {
    /// Split a settings blob of NUL-terminated commands
    ///
    /// Empty commands are kept so [`MapInfo::settings_blob`] rebuilds the
    /// same bytes. A missing final terminator is tolerated.
    pub fn parse_settings(blob: &[u8]) -> Vec<String> {
        if blob.is_empty() {
            return Vec::new();
        }
        let body = blob.strip_suffix(&[0]).unwrap_or(blob);
        body.split(|&byte| byte == 0)
            .map(|command| String::from_utf8_lossy(command).into_owned())
            .collect()
    }

    pub fn settings_blob(&self) -> Vec<u8> {
        let mut blob = Vec::new();
        for command in &self.settings {
            blob.extend_from_slice(command.as_bytes());
            blob.push(0);
        }
        blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_blob() {
        let info = MapInfo {
            settings: vec!["sv_gametype ctf".into(), "sv_scorelimit 500".into()],
            ..Default::default()
        };
        let blob = info.settings_blob();
        assert_eq!(blob, b"sv_gametype ctf\0sv_scorelimit 500\0");
        assert_eq!(MapInfo::parse_settings(&blob), info.settings);
        assert!(MapInfo::parse_settings(b"").is_empty());
    }

    #[test]
    fn test_empty_commands_survive() {
        let blob = b"sv_a 1\0\0sv_b 2\0";
        let settings = MapInfo::parse_settings(blob);
        assert_eq!(settings, vec!["sv_a 1", "", "sv_b 2"]);

        let info = MapInfo {
            settings,
            ..Default::default()
        };
        assert_eq!(info.settings_blob(), blob);

        assert_eq!(MapInfo::parse_settings(b"\0"), vec![""]);
        assert_eq!(MapInfo::parse_settings(b"sv_a 1\0sv_b"), vec!["sv_a 1", "sv_b"]);
    }
}

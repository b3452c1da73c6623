use crate::page::Pagination;

/// Default edge length of a chord diagram, in points.
pub const DEFAULT_GRID_SIZE: f64 = 30.0;

/// Run-wide options, fixed before the first song is read.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Settings {
    pub pagination: Pagination,
    /// Semitones added to every chord.
    pub transpose: i32,
    pub lyrics_only: bool,
    /// Skip the chord row of lines without chords.
    pub auto_space: bool,
    /// Start every song with the grid appendix off.
    pub no_grids: bool,
    /// Leave easy builtin chords out of the grid appendix.
    pub no_easy_grids: bool,
    pub auto_adjust: bool,
    pub table_of_contents: bool,
    /// Number logical pages instead of physical sheets.
    pub number_logical: bool,
    pub first_page: Option<u32>,
    pub even_pages_left: bool,
    pub grid_size: f64,
    pub warning_level: u32,
    pub extensions: bool,
    /// Forget chords defined in a song when the next one starts.
    pub drop_song_definitions: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pagination: Pagination::One,
            transpose: 0,
            lyrics_only: false,
            auto_space: false,
            no_grids: false,
            no_easy_grids: false,
            auto_adjust: true,
            table_of_contents: false,
            number_logical: false,
            first_page: None,
            even_pages_left: false,
            grid_size: DEFAULT_GRID_SIZE,
            warning_level: 0,
            extensions: false,
            drop_song_definitions: false,
        }
    }
}

impl Settings {
    /// Whether every page gets a number, not only continuation pages.
    pub fn number_all(&self) -> bool {
        self.first_page.is_some() || self.table_of_contents || self.even_pages_left
    }
}

/// Startup values given on the command line. They win over configuration
/// files and lose to directives in a song.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Overrides {
    pub text_font: Option<String>,
    pub text_size: Option<i32>,
    pub chord_font: Option<String>,
    pub chord_size: Option<i32>,
    pub extensions: Option<bool>,
    pub paper: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering_everything_follows_options() {
        let mut settings = Settings::default();
        assert!(!settings.number_all());
        settings.first_page = Some(3);
        assert!(settings.number_all());
        settings = Settings {
            table_of_contents: true,
            ..Settings::default()
        };
        assert!(settings.number_all());
    }
}

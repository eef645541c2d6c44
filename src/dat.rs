use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;

use crate::types::Checksum;

/// One required file of a game, as declared by the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct RomEntry {
    pub name: String,
    pub size: Option<u64>,
    pub crc32: Option<String>,
    pub md5: Option<String>,
    pub sha1: Option<String>,
    pub sha256: Option<String>,
}

impl RomEntry {
    pub fn digest(&self, algorithm: Checksum) -> Option<&str> {
        match algorithm {
            Checksum::Crc32 => self.crc32.as_deref(),
            Checksum::Md5 => self.md5.as_deref(),
            Checksum::Sha1 => self.sha1.as_deref(),
            Checksum::Sha256 => self.sha256.as_deref(),
        }
    }
}

/// A named collection of required files that together constitute one
/// complete, verifiable release. Read-only to the assembly core.
#[derive(Debug, Clone, Serialize)]
pub struct Game {
    pub name: String,
    pub roms: Vec<RomEntry>,
}

/// Stable identity of a game within one loaded catalog. Aggregation is keyed
/// by this, never by references into the catalog's own storage.
pub type GameId = usize;

/// Non-owning reference to one file-entry of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryRef {
    pub game: GameId,
    pub rom: usize,
}

/// The external database of known-good games, indexed by content fingerprint
/// for exactly one checksum algorithm.
#[derive(Debug)]
pub struct Catalog {
    games: Vec<Game>,
    index: HashMap<String, Vec<EntryRef>>,
    algorithm: Checksum,
}

impl Catalog {
    /// Build a catalog from already-parsed games. Entries that do not carry
    /// a digest for `algorithm` are simply absent from the index.
    pub fn from_games(games: Vec<Game>, algorithm: Checksum) -> Self {
        let mut index: HashMap<String, Vec<EntryRef>> = HashMap::new();
        for (game_idx, game) in games.iter().enumerate() {
            for (rom_idx, rom) in game.roms.iter().enumerate() {
                if let Some(digest) = rom.digest(algorithm) {
                    index
                        .entry(digest.to_ascii_lowercase())
                        .or_default()
                        .push(EntryRef {
                            game: game_idx,
                            rom: rom_idx,
                        });
                }
            }
        }

        Self {
            games,
            index,
            algorithm,
        }
    }

    pub fn load(path: &Path, algorithm: Checksum) -> anyhow::Result<Self> {
        let games = parse_dat_games(path)?;
        Ok(Self::from_games(games, algorithm))
    }

    /// Content Matcher: all catalog file-entries sharing `fingerprint`.
    pub fn lookup_by_fingerprint(&self, fingerprint: &str) -> &[EntryRef] {
        self.index
            .get(fingerprint.to_ascii_lowercase().as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn game(&self, id: GameId) -> &Game {
        &self.games[id]
    }

    pub fn rom(&self, entry: EntryRef) -> &RomEntry {
        &self.games[entry.game].roms[entry.rom]
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn algorithm(&self) -> Checksum {
        self.algorithm
    }
}

/// Parse a Logiqx-style DAT file into its games. Accepts both `<game>` and
/// `<machine>` elements and both self-closing and open `<rom>` forms.
pub fn parse_dat_games(path: &Path) -> anyhow::Result<Vec<Game>> {
    let mut reader = Reader::from_file(path)
        .with_context(|| format!("unable to open DAT file: {}", path.to_string_lossy()))?;
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut games: Vec<Game> = Vec::new();
    let mut current: Option<Game> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e))
                if e.name().as_ref() == b"game" || e.name().as_ref() == b"machine" =>
            {
                let name = e
                    .attributes()
                    .filter_map(Result::ok)
                    .find(|a| a.key.as_ref() == b"name")
                    .and_then(|a| String::from_utf8(a.value.into_owned()).ok())
                    .unwrap_or_default();
                current = Some(Game {
                    name,
                    roms: Vec::new(),
                });
            }
            Ok(Event::End(ref e))
                if e.name().as_ref() == b"game" || e.name().as_ref() == b"machine" =>
            {
                if let Some(game) = current.take() {
                    games.push(game);
                }
            }
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"rom" => {
                let mut rom = RomEntry {
                    name: String::new(),
                    size: None,
                    crc32: None,
                    md5: None,
                    sha1: None,
                    sha256: None,
                };

                for attr in e.attributes().flatten() {
                    let key = attr.key.as_ref();
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match key {
                        b"name" | b"NAME" => rom.name = value,
                        b"size" | b"SIZE" => rom.size = value.parse().ok(),
                        b"crc" | b"CRC" => rom.crc32 = Some(value.to_ascii_lowercase()),
                        b"md5" | b"MD5" => rom.md5 = Some(value.to_ascii_lowercase()),
                        b"sha1" | b"SHA1" => rom.sha1 = Some(value.to_ascii_lowercase()),
                        b"sha256" | b"SHA256" => rom.sha256 = Some(value.to_ascii_lowercase()),
                        _ => {}
                    }
                }

                // Loose <rom> outside any game element is dropped.
                if let Some(game) = current.as_mut() {
                    game.roms.push(rom);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                anyhow::bail!("malformed DAT {}: {e}", path.to_string_lossy());
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_dat(xml: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(xml.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn parses_self_closing_and_open_rom_forms() {
        let f = write_dat(
            r#"<datafile>
                <game name="Alpha">
                    <rom name="a.bin" size="3" sha1="AA11"/>
                    <rom name="b.bin" sha1="bb22"></rom>
                </game>
                <machine name="Beta">
                    <rom name="c.bin" crc="DEADBEEF" md5="CC33"/>
                </machine>
            </datafile>"#,
        );

        let games = parse_dat_games(f.path()).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].name, "Alpha");
        assert_eq!(games[0].roms.len(), 2);
        assert_eq!(games[0].roms[0].size, Some(3));
        // Digests are normalized to lowercase on load.
        assert_eq!(games[0].roms[0].sha1.as_deref(), Some("aa11"));
        assert_eq!(games[1].name, "Beta");
        assert_eq!(games[1].roms[0].crc32.as_deref(), Some("deadbeef"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let f = write_dat(
            r#"<datafile><game name="Alpha"><rom name="a.bin" sha1="AbCd"/></game></datafile>"#,
        );
        let catalog = Catalog::load(f.path(), Checksum::Sha1).unwrap();

        let entries = catalog.lookup_by_fingerprint("ABCD");
        assert_eq!(entries.len(), 1);
        assert_eq!(catalog.game(entries[0].game).name, "Alpha");
        assert_eq!(catalog.rom(entries[0]).name, "a.bin");
    }

    #[test]
    fn entries_without_configured_digest_are_not_indexed() {
        let f = write_dat(
            r#"<datafile>
                <game name="Alpha">
                    <rom name="a.bin" crc="01020304"/>
                    <rom name="b.bin" sha1="ffff"/>
                </game>
            </datafile>"#,
        );
        let catalog = Catalog::load(f.path(), Checksum::Sha1).unwrap();

        assert!(catalog.lookup_by_fingerprint("01020304").is_empty());
        assert_eq!(catalog.lookup_by_fingerprint("ffff").len(), 1);
        // Both entries still count toward the game's requirement.
        assert_eq!(catalog.game(0).roms.len(), 2);
    }

    #[test]
    fn shared_fingerprint_fans_out_across_games() {
        let f = write_dat(
            r#"<datafile>
                <game name="Alpha"><rom name="x.bin" sha1="11"/></game>
                <game name="Beta"><rom name="x.bin" sha1="11"/></game>
            </datafile>"#,
        );
        let catalog = Catalog::load(f.path(), Checksum::Sha1).unwrap();

        let entries = catalog.lookup_by_fingerprint("11");
        assert_eq!(entries.len(), 2);
        assert_ne!(entries[0].game, entries[1].game);
    }

    #[test]
    fn missing_dat_file_is_an_error() {
        let err = Catalog::load(Path::new("/nonexistent/games.dat"), Checksum::Sha1).unwrap_err();
        assert!(err.to_string().contains("unable to open DAT file"));
    }
}

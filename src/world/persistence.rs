/// Optional region-file persistence for the chunk cache
///
/// One file per 32x32-chunk region, little-endian, no compression:
///
/// ```text
/// u32  numColumns
/// repeat numColumns:
///   i32 chunkX
///   i32 chunkZ
///   u32 numSections
///   repeat numSections:
///     i32 sectionY
///     1024 bytes section payload   ; 2 bits per voxel, index = y*256 + z*16 + x
/// ```
///
/// Corrupted or short files are skipped with a warning, never fatal; the
/// cache continues in memory.
use bevy::log::{info, warn};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{NavigatorError, Result};
use crate::world::chunk_cache::{CachedSection, ChunkCache};

/// Section payload size: 16*16*16 voxels at 2 bits each
const SECTION_BYTES: usize = 1024;

/// Replace anything outside `[A-Za-z0-9._-]` so server addresses form valid
/// directory names
fn sanitize(addr: &str) -> String {
    addr.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Directory holding this world's region files
fn cache_dir(base: &Path, world_name: &str, server_addr: Option<&str>) -> PathBuf {
    match server_addr {
        Some(addr) => base.join(sanitize(addr)).join(world_name),
        None => base.join(world_name),
    }
}

/// Write every cached column, grouped by region. Returns columns written.
pub fn save_cache(
    cache: &ChunkCache,
    base: &Path,
    world_name: &str,
    server_addr: Option<&str>,
) -> Result<usize> {
    let dir = cache_dir(base, world_name, server_addr);
    fs::create_dir_all(&dir)?;

    // Group columns by their 32x32 region
    let mut regions: HashMap<(i32, i32), Vec<Vec<u8>>> = HashMap::new();
    let mut total_columns = 0usize;

    for ((chunk_x, chunk_z), sections) in cache.iter_columns() {
        let mut body: Vec<u8> = Vec::new();
        body.extend_from_slice(&chunk_x.to_le_bytes());
        body.extend_from_slice(&chunk_z.to_le_bytes());

        let sections: Vec<(i32, &CachedSection)> = sections
            .iter()
            .map(|(section_y, section)| (*section_y, section))
            .filter(|(_, s)| !s.is_all_air())
            .collect();
        body.extend_from_slice(&(sections.len() as u32).to_le_bytes());
        for (section_y, section) in sections {
            body.extend_from_slice(&section_y.to_le_bytes());
            body.extend_from_slice(section.bytes());
        }

        let region = (chunk_x.div_euclid(32), chunk_z.div_euclid(32));
        regions.entry(region).or_default().push(body);
        total_columns += 1;
    }

    for ((rx, rz), column_blobs) in regions {
        let path = dir.join(format!("r.{}.{}.cache", rx, rz));
        let mut file = fs::File::create(&path)?;
        file.write_all(&(column_blobs.len() as u32).to_le_bytes())?;
        for blob in column_blobs {
            file.write_all(&blob)?;
        }
    }

    info!(
        "💾 Saved {} cached columns under {}",
        total_columns,
        dir.display()
    );
    Ok(total_columns)
}

/// Cursor over a raw region file; any read past the end flags corruption
struct Reader<'a> {
    data: &'a [u8],
    at: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, at: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.at + n > self.data.len() {
            return Err(NavigatorError::persistence("short read"));
        }
        let slice = &self.data[self.at..self.at + n];
        self.at += n;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self) -> Result<i32> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Parse a whole region file into detached columns. Nothing touches the
/// live cache here: a short read anywhere discards the entire file, so a
/// corrupt region contributes zero columns instead of a prefix.
fn parse_region(data: &[u8]) -> Result<Vec<(i32, i32, HashMap<i32, CachedSection>)>> {
    let mut reader = Reader::new(data);
    let num_columns = reader.u32()?;
    if num_columns > 32 * 32 {
        // A region spans 32x32 chunks; anything larger is garbage
        return Err(NavigatorError::persistence(format!(
            "implausible column count {}",
            num_columns
        )));
    }
    let mut columns = Vec::with_capacity(num_columns as usize);

    for _ in 0..num_columns {
        let chunk_x = reader.i32()?;
        let chunk_z = reader.i32()?;
        let num_sections = reader.u32()?;

        let mut sections = HashMap::new();
        for _ in 0..num_sections {
            let section_y = reader.i32()?;
            let payload = reader.take(SECTION_BYTES)?;
            let mut bytes = [0u8; SECTION_BYTES];
            bytes.copy_from_slice(payload);
            sections.insert(section_y, CachedSection::from_bytes(bytes));
        }

        columns.push((chunk_x, chunk_z, sections));
    }

    Ok(columns)
}

/// Load every region file in this world's cache directory.
/// Returns the number of columns loaded; corrupt files load zero and are
/// skipped.
pub fn load_cache(
    cache: &mut ChunkCache,
    base: &Path,
    world_name: &str,
    server_addr: Option<&str>,
) -> Result<usize> {
    let dir = cache_dir(base, world_name, server_addr);
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut loaded = 0usize;
    let mut skipped = 0usize;
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with("r.") || !name.ends_with(".cache") {
            continue;
        }
        let data = match fs::read(entry.path()) {
            Ok(data) => data,
            Err(e) => {
                warn!("⚠️ Unreadable cache region {}: {}", name, e);
                skipped += 1;
                continue;
            }
        };
        match parse_region(&data) {
            Ok(columns) => {
                loaded += columns.len();
                for (chunk_x, chunk_z, sections) in columns {
                    cache.insert_loaded_column(chunk_x, chunk_z, sections);
                }
            }
            Err(e) => {
                warn!("⚠️ Corrupt cache region {}: {} - skipped", name, e);
                skipped += 1;
            }
        }
    }

    info!(
        "📂 Loaded {} cached columns from {} ({} files skipped)",
        loaded,
        dir.display(),
        skipped
    );
    Ok(loaded)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::sandbox_table;
    use crate::types::BlockPos;

    fn temp_base(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "voxel-navigator-test-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn populated_cache() -> ChunkCache {
        let table = sandbox_table();
        let stone = table.id_by_name("stone").unwrap();
        let water = table.id_by_name("water").unwrap();
        let mut cache = ChunkCache::new(-64, 320);
        cache.insert_loaded_column(0, 0, HashMap::new());
        cache.insert_loaded_column(-3, 7, HashMap::new());
        cache.insert_loaded_column(40, -2, HashMap::new()); // different region

        for x in 0..16 {
            for z in 0..16 {
                cache.on_block_update(BlockPos::new(x, 63, z), stone, false, &table);
            }
        }
        cache.on_block_update(BlockPos::new(-48 + 5, 10, 7 * 16 + 2), water, false, &table);
        cache.on_block_update(BlockPos::new(40 * 16 + 1, 200, -32 + 9), stone, false, &table);
        cache
    }

    #[test]
    fn test_save_load_round_trip() {
        let base = temp_base("roundtrip");
        let mut original = populated_cache();
        let saved = save_cache(&original, &base, "overworld", None).unwrap();
        assert_eq!(saved, 3);

        let mut restored = ChunkCache::new(-64, 320);
        let loaded = load_cache(&mut restored, &base, "overworld", None).unwrap();
        assert_eq!(loaded, 3);

        // Every cached voxel reproduces identically
        for x in -64..64 {
            for z in -64..130 {
                for y in [10, 63, 200] {
                    let pos = BlockPos::new(x, y, z);
                    assert_eq!(
                        original.voxel_at(pos),
                        restored.voxel_at(pos),
                        "mismatch at {}",
                        pos
                    );
                }
            }
        }
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn test_corrupt_file_is_skipped() {
        let base = temp_base("corrupt");
        let dir = base.join("overworld");
        fs::create_dir_all(&dir).unwrap();
        // Claims one column but truncates mid-header
        fs::write(dir.join("r.0.0.cache"), [1u8, 0, 0, 0, 9, 9]).unwrap();

        let mut cache = ChunkCache::new(-64, 320);
        let loaded = load_cache(&mut cache, &base, "overworld", None).unwrap();
        assert_eq!(loaded, 0);
        assert_eq!(cache.column_count(), 0);
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn test_truncated_tail_discards_whole_file() {
        let base = temp_base("truncated-tail");
        let dir = base.join("overworld");
        fs::create_dir_all(&dir).unwrap();

        // Two columns claimed: the first fully valid, the second cut off
        // mid-header. The valid prefix must still load zero columns.
        let mut data = Vec::new();
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&0i32.to_le_bytes()); // chunkX
        data.extend_from_slice(&0i32.to_le_bytes()); // chunkZ
        data.extend_from_slice(&1u32.to_le_bytes()); // numSections
        data.extend_from_slice(&4i32.to_le_bytes()); // sectionY
        data.extend_from_slice(&[0xFFu8; 1024]); // all-solid payload
        data.extend_from_slice(&9i32.to_le_bytes()); // second column, truncated
        fs::write(dir.join("r.0.0.cache"), &data).unwrap();

        let mut cache = ChunkCache::new(-64, 320);
        let loaded = load_cache(&mut cache, &base, "overworld", None).unwrap();
        assert_eq!(loaded, 0);
        assert_eq!(cache.column_count(), 0);
        // The valid first column must not be resident either
        assert_eq!(cache.voxel_at(BlockPos::new(0, 70, 0)), None);
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn test_server_address_is_sanitized() {
        let base = temp_base("sanitize");
        let cache = populated_cache();
        save_cache(&cache, &base, "overworld", Some("play.example.org:25565")).unwrap();
        assert!(base.join("play.example.org_25565").join("overworld").is_dir());
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn test_missing_directory_loads_zero() {
        let base = temp_base("missing");
        let mut cache = ChunkCache::new(-64, 320);
        assert_eq!(load_cache(&mut cache, &base, "overworld", None).unwrap(), 0);
    }
}

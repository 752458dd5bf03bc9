// crates/lexalign-store/src/spaces.rs
//
// Embedding spaces in word2vec text format.
//
// File layout:
//   <count> <dims>            optional header
//   <word> <v1> <v2> ... <vd>  one row per word
//
// A two-integer first line followed by 1-component rows is read as a row
// of a 1-dimensional space unless it declares `dims = 1`. A file holding
// only a header line is empty.
//
// The corpus name is the file stem, so `news.vec` loads as space "news".

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use lexalign_core::{EmbeddingSpace, LexAlignError};

/// File extensions recognised as embedding spaces.
const SPACE_EXTENSIONS: &[&str] = &["vec", "txt"];

/// List embedding space files in `dir`, sorted by path.
pub fn discover_spaces(dir: &Path) -> Result<Vec<PathBuf>, LexAlignError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        LexAlignError::Storage(format!("Failed to read directory {}: {}", dir.display(), e))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_space = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| SPACE_EXTENSIONS.contains(&ext))
                .unwrap_or(false);
        if is_space {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn parse_error(path: &Path, line: usize, message: impl Into<String>) -> LexAlignError {
    LexAlignError::Parse {
        path: path.display().to_string(),
        line,
        message: message.into(),
    }
}

/// Load one word2vec text file as an `EmbeddingSpace` named by its stem.
pub fn load_space(path: &Path) -> Result<EmbeddingSpace, LexAlignError> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| LexAlignError::NotFound(format!("no file stem in {}", path.display())))?
        .to_string();

    let file = File::open(path).map_err(|e| {
        LexAlignError::Storage(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let mut header: Option<(usize, usize)> = None;
    // A first line of two integers is either the header or the row of a
    // 1-dimensional space whose word is numeric. The first data row decides.
    let mut pending: Option<(String, f32)> = None;
    let mut dims: Option<usize> = None;
    let mut rows: Vec<(String, Vec<f32>)> = Vec::new();

    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        let mut fields = line.split_whitespace();
        let word = match fields.next() {
            Some(w) => w,
            None => continue,
        };
        let rest: Vec<&str> = fields.collect();

        if rows.is_empty() && header.is_none() && rest.len() == 1 {
            if let (Ok(count), Ok(d)) = (word.parse::<usize>(), rest[0].parse::<usize>()) {
                header = Some((count, d));
                pending = Some((word.to_string(), d as f32));
                continue;
            }
        }

        let vector = rest
            .iter()
            .map(|v| v.parse::<f32>())
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|e| parse_error(path, line_no, format!("bad component: {}", e)))?;
        if vector.is_empty() {
            return Err(parse_error(path, line_no, format!("word '{}' has no vector", word)));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(parse_error(
                path,
                line_no,
                format!("word '{}' has a NaN or infinite component", word),
            ));
        }

        if let (Some((_, d)), Some((first_word, first_value))) = (header, pending.take()) {
            if vector.len() == 1 && d != 1 {
                header = None;
                rows.push((first_word, vec![first_value]));
                dims = Some(1);
            } else {
                dims = Some(d);
            }
        }

        match dims {
            Some(d) if d != vector.len() => {
                return Err(parse_error(
                    path,
                    line_no,
                    format!("expected {} components, found {}", d, vector.len()),
                ));
            }
            Some(_) => {}
            None => dims = Some(vector.len()),
        }

        rows.push((word.to_string(), vector));
    }

    if let Some((count, _)) = header {
        if count != rows.len() {
            tracing::warn!(
                "{}: header declares {} words but {} rows were read",
                path.display(),
                count,
                rows.len()
            );
        }
    }

    let space = EmbeddingSpace::from_rows(name, rows)?;
    tracing::info!(
        "Loaded embedding space {} ({} words, {} dims)",
        space.name(),
        space.len(),
        space.dims()
    );
    Ok(space)
}

/// Write `space` in word2vec text format with a header line.
pub fn save_space(space: &EmbeddingSpace, path: &Path) -> Result<(), LexAlignError> {
    let file = File::create(path).map_err(|e| {
        LexAlignError::Storage(format!("Failed to create {}: {}", path.display(), e))
    })?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{} {}", space.len(), space.dims())?;
    for (i, word) in space.index().words().iter().enumerate() {
        write!(out, "{}", word)?;
        for value in space.vectors().row(i).iter() {
            write!(out, " {}", value)?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "news.vec", "2 3\nbank 0.1 0.2 0.3\nriver 1 0 -1\n");
        let space = load_space(&path).unwrap();
        assert_eq!(space.name(), "news");
        assert_eq!(space.len(), 2);
        assert_eq!(space.dims(), 3);
        assert_eq!(space.vector("river").unwrap(), vec![1.0, 0.0, -1.0]);
    }

    #[test]
    fn loads_without_header_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "fiction.txt", "dragon 1 2\n\nknight 3 4\n");
        let space = load_space(&path).unwrap();
        assert_eq!(space.index().words(), &["dragon", "knight"]);
    }

    #[test]
    fn ragged_rows_report_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.vec", "a 1 2\nb 1 2 3\n");
        let err = load_space(&path).unwrap_err();
        assert!(matches!(err, LexAlignError::Parse { line: 2, .. }));
    }

    #[test]
    fn header_dims_are_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.vec", "1 3\na 1 2\n");
        let err = load_space(&path).unwrap_err();
        assert!(matches!(err, LexAlignError::Parse { line: 2, .. }));
    }

    #[test]
    fn bad_numbers_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.vec", "a 1 x\n");
        assert!(matches!(
            load_space(&path),
            Err(LexAlignError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn non_finite_components_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for bad in ["NaN", "inf", "-inf"] {
            let path = write(
                dir.path(),
                "bad.vec",
                &format!("gato 1 0\nperro 0 1\nzzz {} 1\n", bad),
            );
            assert!(matches!(
                load_space(&path),
                Err(LexAlignError::Parse { line: 3, .. })
            ));
        }
    }

    #[test]
    fn numeric_first_word_in_one_dimensional_space_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "years.vec", "2020 5\n1999 7\n");
        let space = load_space(&path).unwrap();
        assert_eq!(space.dims(), 1);
        assert_eq!(space.index().words(), &["1999", "2020"]);
        assert_eq!(space.vector("2020").unwrap(), vec![5.0]);
    }

    #[test]
    fn one_dimensional_header_is_still_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "tiny.vec", "2 1\na 0.5\nb -1\n");
        let space = load_space(&path).unwrap();
        assert_eq!(space.index().words(), &["a", "b"]);
    }

    #[test]
    fn empty_file_is_empty_vocabulary() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "empty.vec", "");
        assert!(matches!(load_space(&path), Err(LexAlignError::EmptyVocabulary)));
    }

    #[test]
    fn save_then_load_preserves_space() {
        let dir = tempfile::tempdir().unwrap();
        let original = EmbeddingSpace::from_rows(
            "roundtrip",
            vec![("b", vec![0.25, -1.5]), ("a", vec![3.0, 0.125])],
        )
        .unwrap();
        let path = dir.path().join("roundtrip.vec");
        save_space(&original, &path).unwrap();
        let loaded = load_space(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn discovery_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.vec", "x 1\n");
        write(dir.path(), "a.txt", "x 1\n");
        write(dir.path(), "counts.json", "{}");
        fs::create_dir(dir.path().join("nested.vec")).unwrap();
        let found = discover_spaces(dir.path()).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.vec"]);
    }
}

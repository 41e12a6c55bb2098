//! CSV input/output for the flashcard table.
//!
//! Input needs a `word` column; the provenance definition column is
//! optional and matched against a small set of accepted header names.
//! Output is always the four-column enriched table.

use std::path::Path;

/// One usable input row.
#[derive(Debug, Clone)]
pub struct RowIn {
    pub word: String,
    pub duolingo_definition: String,
}

/// One output row. The provenance field passes through unmodified.
#[derive(Debug, Clone)]
pub struct RowOut {
    pub word: String,
    pub duolingo_definition: String,
    pub model_definition: String,
    pub cleaned_definition: String,
}

/// Accepted header names for the provenance column, first match wins.
const DUO_COLUMN_CANDIDATES: [&str; 4] =
    ["duolingo_definition", "duolingo", "definition", "duo_definition"];

const OUTPUT_HEADER: [&str; 4] = [
    "word",
    "duolingo_definition",
    "model_definition",
    "cleaned_definition",
];

/// Read the input table. Rows with a blank word are skipped.
pub fn read_input_csv(path: &Path) -> Result<Vec<RowIn>, String> {
    let mut reader =
        csv::Reader::from_path(path).map_err(|e| format!("Cannot read {:?}: {}", path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("Cannot read CSV header: {}", e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let word_idx = headers
        .iter()
        .position(|h| h == "word")
        .ok_or_else(|| "Input CSV must contain a \"word\" column.".to_string())?;

    let duo_idx = DUO_COLUMN_CANDIDATES
        .iter()
        .find_map(|candidate| headers.iter().position(|h| h == candidate));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| format!("CSV read error: {}", e))?;
        let word = record.get(word_idx).unwrap_or("").trim().to_string();
        if word.is_empty() {
            continue;
        }
        let duo = duo_idx
            .and_then(|i| record.get(i))
            .unwrap_or("")
            .trim()
            .to_string();
        rows.push(RowIn {
            word,
            duolingo_definition: duo,
        });
    }
    Ok(rows)
}

/// Write the enriched table with the fixed four-column header.
pub fn write_output_csv(path: &Path, rows: &[RowOut]) -> Result<(), String> {
    let mut writer =
        csv::Writer::from_path(path).map_err(|e| format!("Cannot write {:?}: {}", path, e))?;

    writer
        .write_record(OUTPUT_HEADER)
        .map_err(|e| format!("CSV write error: {}", e))?;
    for row in rows {
        writer
            .write_record([
                &row.word,
                &row.duolingo_definition,
                &row.model_definition,
                &row.cleaned_definition,
            ])
            .map_err(|e| format!("CSV write error: {}", e))?;
    }
    writer
        .flush()
        .map_err(|e| format!("CSV write error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_word_and_provenance_columns() {
        let dir = tempdir().unwrap();
        let path = write_file(
            &dir,
            "in.csv",
            "word,duolingo_definition\ncomer,to eat\nbeber,to drink\n",
        );
        let rows = read_input_csv(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].word, "comer");
        assert_eq!(rows[0].duolingo_definition, "to eat");
    }

    #[test]
    fn accepts_alternate_provenance_headers() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "in.csv", "word,definition\nvivir,to live\n");
        let rows = read_input_csv(&path).unwrap();
        assert_eq!(rows[0].duolingo_definition, "to live");
    }

    #[test]
    fn provenance_column_is_optional() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "in.csv", "word\ncomer\n");
        let rows = read_input_csv(&path).unwrap();
        assert_eq!(rows[0].duolingo_definition, "");
    }

    #[test]
    fn skips_blank_words_and_trims() {
        let dir = tempdir().unwrap();
        let path = write_file(
            &dir,
            "in.csv",
            "word,definition\n  comer  ,  to eat \n   ,skipped\n",
        );
        let rows = read_input_csv(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].word, "comer");
        assert_eq!(rows[0].duolingo_definition, "to eat");
    }

    #[test]
    fn missing_word_column_is_an_error() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "in.csv", "palabra,definition\ncomer,to eat\n");
        assert!(read_input_csv(&path).is_err());
    }

    #[test]
    fn writes_fixed_four_column_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![RowOut {
            word: "comer".to_string(),
            duolingo_definition: "to eat".to_string(),
            model_definition: "to eat (food)".to_string(),
            cleaned_definition: "to eat".to_string(),
        }];
        write_output_csv(&path, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("word,duolingo_definition,model_definition,cleaned_definition")
        );
        assert_eq!(lines.next(), Some("comer,to eat,to eat (food),to eat"));
    }
}

use std::io::Read;
use std::path::Path;

use crate::errors::AppError;
use crate::models::post::{Post, PostId};

/// Names of the identifier and text columns in the input CSV.
#[derive(Debug, Clone)]
pub struct DatasetColumns {
    pub id: String,
    pub content: String,
}

impl Default for DatasetColumns {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            content: "content".to_string(),
        }
    }
}

/// Reads the whole dataset into memory, preserving row order.
pub fn load_posts(path: &Path, columns: &DatasetColumns) -> Result<Vec<Post>, AppError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    read_posts(reader, path, columns)
}

fn read_posts<R: Read>(
    mut reader: csv::Reader<R>,
    source: &Path,
    columns: &DatasetColumns,
) -> Result<Vec<Post>, AppError> {
    let headers = reader.headers()?.clone();
    let column_index = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| AppError::Dataset {
                path: source.to_path_buf(),
                message: format!("missing column '{name}'"),
            })
    };
    let id_idx = column_index(&columns.id)?;
    let content_idx = column_index(&columns.content)?;

    let mut posts = Vec::new();
    for record in reader.records() {
        let record = record?;
        posts.push(Post {
            id: PostId::from_cell(record.get(id_idx).unwrap_or_default()),
            content: record.get(content_idx).unwrap_or_default().to_string(),
        });
    }
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn from_str(data: &str, columns: &DatasetColumns) -> Result<Vec<Post>, AppError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_bytes());
        read_posts(reader, Path::new("inline.csv"), columns)
    }

    #[test]
    fn test_reads_rows_in_order() {
        let posts = from_str(
            "id,content\n0,I feel a bit sad today...\n1,\"Long day, but fine\"\n",
            &DatasetColumns::default(),
        )
        .unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, PostId::Int(0));
        assert_eq!(posts[0].content, "I feel a bit sad today...");
        assert_eq!(posts[1].content, "Long day, but fine");
    }

    #[test]
    fn test_extra_columns_and_reordering_are_fine() {
        let posts = from_str(
            "subreddit,content,label,id\nSuicideWatch,hello,3,abc\n",
            &DatasetColumns::default(),
        )
        .unwrap();
        assert_eq!(posts[0].id, PostId::Text("abc".to_string()));
        assert_eq!(posts[0].content, "hello");
    }

    #[test]
    fn test_multiline_content_cell() {
        let posts = from_str(
            "id,content\n7,\"line one\nline two\"\n",
            &DatasetColumns::default(),
        )
        .unwrap();
        assert_eq!(posts[0].content, "line one\nline two");
    }

    #[test]
    fn test_short_row_yields_empty_content() {
        let posts = from_str("id,content\n5\n", &DatasetColumns::default()).unwrap();
        assert_eq!(posts[0].id, PostId::Int(5));
        assert_eq!(posts[0].content, "");
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let err = from_str("id,text\n0,hi\n", &DatasetColumns::default()).unwrap_err();
        assert!(matches!(err, AppError::Dataset { ref message, .. } if message.contains("content")));
    }

    #[test]
    fn test_custom_column_names() {
        let columns = DatasetColumns {
            id: "post_id".to_string(),
            content: "body".to_string(),
        };
        let posts = from_str("post_id,body\n12,text\n", &columns).unwrap();
        assert_eq!(posts[0].id, PostId::Int(12));
    }

    #[test]
    fn test_load_posts_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,content").unwrap();
        writeln!(file, "0,first").unwrap();
        writeln!(file, "1,second").unwrap();
        file.flush().unwrap();

        let posts = load_posts(file.path(), &DatasetColumns::default()).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].content, "second");
    }

    #[test]
    fn test_load_posts_missing_file_is_csv_error() {
        let err = load_posts(Path::new("/nonexistent/c-ssrs.csv"), &DatasetColumns::default())
            .unwrap_err();
        assert!(matches!(err, AppError::Csv(_)));
    }
}

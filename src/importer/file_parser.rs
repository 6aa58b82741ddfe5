// ==========================================
// 配方可生产性检查 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 按列位置排列的行（不按表头取值）
// ==========================================

use crate::importer::dataset_importer_trait::FileParser;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

// ==========================================
// RawSheet / RawRow - 解析结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 源文件中的行号（表头为第 1 行）
    pub row_number: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    /// 取指定列,TRIM 后为空视为缺失
    pub fn cell(&self, column: usize) -> Option<&str> {
        self.cells
            .get(column)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }

    fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawSheet {
    /// 列数（取表头与数据行中最宽者）
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.cells.len())
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }
}

fn check_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawSheet> {
        check_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            let row = RawRow {
                row_number,
                cells: record.iter().map(|v| v.trim().to_string()).collect(),
            };

            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        Ok(RawSheet { headers, rows })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

/// 单元格转文本: 整数值浮点数去掉小数部分（1001.0 → 1001）
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        other => other.to_string().trim().to_string(),
    }
}

impl FileParser for ExcelParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawSheet> {
        check_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 只读第一个工作表
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))??;

        // 区域可能不从 A1 开始,左侧补空列以保持列位置
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let pad = start_col as usize;

        let mut sheet_rows = range.rows();
        let headers: Vec<String> = match sheet_rows.next() {
            Some(header_row) => std::iter::repeat(String::new())
                .take(pad)
                .chain(header_row.iter().map(cell_to_string))
                .collect(),
            None => return Ok(RawSheet::default()),
        };

        let mut rows = Vec::new();
        for (idx, data_row) in sheet_rows.enumerate() {
            let row = RawRow {
                // 表头所在行 + 1 + 偏移,按 1 起始计
                row_number: start_row as usize + idx + 2,
                cells: std::iter::repeat(String::new())
                    .take(pad)
                    .chain(data_row.iter().map(cell_to_string))
                    .collect(),
            };
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        Ok(RawSheet { headers, rows })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RawSheet> {
        let path = file_path.as_ref();
        match extension_of(path).as_str() {
            "csv" => CsvParser.parse(path),
            "xlsx" | "xls" => ExcelParser.parse(path),
            other => {
                check_exists(path)?;
                Err(ImportError::UnsupportedFormat(other.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_parser_positional_rows() {
        let file = csv_file(&["Code,Desc,Yearly", " P1 ,Cake,100", "P2,Bread,"]);
        let sheet = CsvParser.parse(file.path()).unwrap();

        assert_eq!(sheet.headers, vec!["Code", "Desc", "Yearly"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].cell(0), Some("P1"));
        assert_eq!(sheet.rows[0].row_number, 2);
        assert_eq!(sheet.rows[1].cell(2), None);
        assert_eq!(sheet.rows[1].cell(7), None);
    }

    #[test]
    fn test_csv_parser_skip_blank_rows() {
        let file = csv_file(&["Code,Desc", "P1,A", ",", "P2,B"]);
        let sheet = CsvParser.parse(file.path()).unwrap();

        assert_eq!(sheet.rows.len(), 2);
        // 行号保持源文件位置
        assert_eq!(sheet.rows[1].row_number, 4);
    }

    #[test]
    fn test_file_not_found() {
        let result = UniversalFileParser.parse("non_existent.csv");
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser.parse(file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_cell_to_string_integral_float() {
        assert_eq!(cell_to_string(&Data::Float(1001.0)), "1001");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::String(" RM1 ".to_string())), "RM1");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}

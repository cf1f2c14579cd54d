use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 分析表的表头（显示顺序）
pub const REPORT_HEADERS: [&str; 5] = ["Particulars", "Unit", "Standard", "Actual", "Remark"];

/// 日报表行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// 序号 (Sl. No.)，仅用于排序，不输出
    pub serial_no: u32,
    /// 指标名称
    pub particulars: String,
    /// 单位
    pub unit: String,
    /// 标准值（已格式化）
    pub standard: String,
    /// 实际值（已格式化）
    pub actual: String,
    /// 备注
    pub remark: String,
}

impl ReportRow {
    pub fn new(serial_no: u32, particulars: &str, unit: &str, standard: &str) -> Self {
        Self {
            serial_no,
            particulars: particulars.to_string(),
            unit: unit.to_string(),
            standard: standard.to_string(),
            actual: String::new(),
            remark: String::new(),
        }
    }

    /// 按 `REPORT_HEADERS` 顺序返回可见列
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.particulars,
            &self.unit,
            &self.standard,
            &self.actual,
            &self.remark,
        ]
    }
}

/// 最终报表，按序号升序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    pub fn get(&self, serial_no: u32) -> Option<&ReportRow> {
        self.rows.iter().find(|row| row.serial_no == serial_no)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 产生警告的提取器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSource {
    Oee,
    ProductionTarget,
    Consumption,
    Inventory,
    OrderDetails,
    Assembly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// 工作表、关键字或日期不存在
    NotFound,
    /// 偏移读取超出工作表范围
    OutOfRange,
    /// 两个提取器产生了相同的序号
    Conflict,
}

/// 提取过程中的非致命警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub source: WarningSource,
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn not_found(source: WarningSource, message: impl Into<String>) -> Self {
        Self {
            source,
            kind: WarningKind::NotFound,
            message: message.into(),
        }
    }

    pub fn out_of_range(source: WarningSource, message: impl Into<String>) -> Self {
        Self {
            source,
            kind: WarningKind::OutOfRange,
            message: message.into(),
        }
    }

    pub fn conflict(source: WarningSource, message: impl Into<String>) -> Self {
        Self {
            source,
            kind: WarningKind::Conflict,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 输出路径
    pub output_path: String,
    /// 分析表工作表名称
    pub analysis_sheet_name: String,
    /// 分析表导出文件名前缀
    pub analysis_file_prefix: String,
    /// 完整导出文件名前缀（同时用于压缩包条目）
    pub report_entry_prefix: String,
    /// 多个报表时的压缩包文件名
    pub archive_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_path: "output".to_string(),
            analysis_sheet_name: "Analysis Points".to_string(),
            analysis_file_prefix: "Analysis_Points_".to_string(),
            report_entry_prefix: "Report_".to_string(),
            archive_name: "All_Analysis_Reports.zip".to_string(),
        }
    }
}

/// 待处理的工作簿及其目标日期
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub path: PathBuf,
    pub target_date: NaiveDate,
}

impl ReportRequest {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }
}

/// 单个工作簿的处理结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub file_name: String,
    pub target_date: String,
    pub table: ReportTable,
    pub warnings: Vec<Warning>,
    /// 仅分析表的 xlsx 内容
    #[serde(skip)]
    pub analysis_workbook: Vec<u8>,
    /// 分析表加全部原始工作表的 xlsx 内容
    #[serde(skip)]
    pub full_workbook: Vec<u8>,
}

/// 文件处理错误
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    pub file: String,
    pub error: String,
}

/// 一次批处理的全部结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub reports: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

/// 每个文件的摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSummary {
    pub file: String,
    pub target_date: String,
    pub analysis_file: String,
    pub warnings: Vec<String>,
}

/// 处理结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResult {
    pub success: bool,
    pub message: String,
    pub generated_count: usize,
    pub failed_count: usize,
    pub output_path: String,
    pub archive: Option<String>,
    pub files: Vec<FileSummary>,
    pub errors: Vec<FileFailure>,
}

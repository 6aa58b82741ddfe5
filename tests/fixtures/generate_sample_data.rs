// ==========================================
// 示例数据生成器
// ==========================================
// 用途: 生成可直接喂给命令行的三份输入文件
// 输出: tests/fixtures/datasets/{small,large}/{targets,stock,history}.csv
// ==========================================

use csv::Writer;
use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

const TARGET_HEADER: &[&str] = &["Product", "Description", "Yearly Qty", "3M Qty"];
const STOCK_HEADER: &[&str] = &[
    "Warehouse", "Bin", "Lot", "RM Code", "Qty", "UoM", "Expiry", "Status", "RM Description",
];
const HISTORY_HEADER: &[&str] = &[
    "RM Code",
    "RM Description",
    "Weighed Qty",
    "Batch",
    "Line",
    "Operator",
    "Date",
    "Scale",
    "Shift",
    "Parent",
    "Parent Description",
];

// 称量历史记录
struct WeighRecord {
    rm: String,
    rm_desc: String,
    batch: String,
    parent: String,
    parent_desc: String,
}

impl WeighRecord {
    fn new(rm: &str, rm_desc: &str, batch: &str, parent: &str, parent_desc: &str) -> Self {
        Self {
            rm: rm.to_string(),
            rm_desc: rm_desc.to_string(),
            batch: batch.to_string(),
            parent: parent.to_string(),
            parent_desc: parent_desc.to_string(),
        }
    }

    fn to_row(&self, index: usize) -> Vec<String> {
        vec![
            self.rm.clone(),
            self.rm_desc.clone(),
            format!("{:.3}", 0.5 + (index % 17) as f64 * 0.25),
            self.batch.clone(),
            format!("L{}", index % 3 + 1),
            format!("OP{:03}", index % 11),
            "2026-01-15".to_string(),
            format!("S{}", index % 4),
            ["A", "B", "C"][index % 3].to_string(),
            self.parent.clone(),
            self.parent_desc.clone(),
        ]
    }
}

fn stock_row(code: &str, desc: &str, index: usize) -> Vec<String> {
    vec![
        "WH01".to_string(),
        format!("BIN-{:02}", index % 40),
        format!("LOT{:05}", index),
        code.to_string(),
        format!("{}", 25 + index % 100),
        "KG".to_string(),
        "2027-06-30".to_string(),
        "RELEASED".to_string(),
        desc.to_string(),
    ]
}

fn write_file<I>(path: &Path, header: &[&str], rows: I) -> Result<usize, Box<dyn Error>>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut wtr = Writer::from_writer(File::create(path)?);
    wtr.write_record(header)?;
    let mut count = 0;
    for row in rows {
        wtr.write_record(&row)?;
        count += 1;
    }
    wtr.flush()?;
    Ok(count)
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("开始生成示例数据集...");

    // 1. 小型数据集（覆盖多批次选优、半成品、循环、自引用）
    generate_small_dataset()?;

    // 2. 大型数据集（性能观察用）
    generate_large_dataset()?;

    println!("✓ 所有示例数据集生成完成！");
    Ok(())
}

fn generate_small_dataset() -> Result<(), Box<dyn Error>> {
    let dir = Path::new("tests/fixtures/datasets/small");
    fs::create_dir_all(dir)?;

    let targets = vec![
        vec!["CAKE", "Chocolate cake", "1,200", "300"],
        vec!["BREAD", "White bread", "800", "n/a"],
        vec!["LOOP", "Loop product", "", ""],
        vec!["FLOUR", "Flour sold as-is", "50", "10"],
        vec!["GHOST", "Never produced", "5", "1"],
    ];
    write_file(
        &dir.join("targets.csv"),
        TARGET_HEADER,
        targets
            .into_iter()
            .map(|r| r.into_iter().map(str::to_string).collect::<Vec<String>>()),
    )?;

    let stock = [
        ("FLOUR", "Flour"),
        ("SUGAR", "Sugar"),
        ("COCOA", "Cocoa"),
        ("WATER", "Water"),
    ];
    write_file(
        &dir.join("stock.csv"),
        STOCK_HEADER,
        stock
            .iter()
            .enumerate()
            .map(|(i, (code, desc))| stock_row(code, desc, i)),
    )?;

    let history = vec![
        WeighRecord::new("FLOUR", "Flour", "B100", "CAKE", "Chocolate cake"),
        WeighRecord::new("VANILLA", "Vanilla", "B100", "CAKE", "Chocolate cake"),
        WeighRecord::new("FLOUR", "Flour", "B200", "CAKE", "Chocolate cake"),
        WeighRecord::new("SUGAR", "Sugar", "B200", "CAKE", "Chocolate cake"),
        WeighRecord::new("COCOA", "Cocoa", "B200", "CAKE", "Chocolate cake"),
        WeighRecord::new("DOUGH", "", "B300", "BREAD", "White bread"),
        WeighRecord::new("FLOUR", "Flour", "B400", "DOUGH", "Bread dough"),
        WeighRecord::new("WATER", "Water", "B400", "DOUGH", "Bread dough"),
        WeighRecord::new("YEAST", "Yeast", "B400", "DOUGH", "Bread dough"),
        WeighRecord::new("LOOP2", "", "B500", "LOOP", "Loop product"),
        WeighRecord::new("LOOP", "", "B600", "LOOP2", "Loop helper"),
        WeighRecord::new("SELF", "", "B700", "SELF", ""),
    ];
    write_file(
        &dir.join("history.csv"),
        HISTORY_HEADER,
        history.iter().enumerate().map(|(i, r)| r.to_row(i)),
    )?;

    println!("✓ 生成 small/ (5 个目标, 12 条称量记录)");
    Ok(())
}

/// 大型数据集结构:
/// - 600 种原料,其中编号为 7 的倍数的不在库
/// - 200 个半成品,每个 3 个批次,每批 4~6 种原料
/// - 每 10 个半成品中有 1 个引用前一个半成品（形成多层链）
/// - 2000 个成品,每个 2 个批次,混用原料与半成品
fn generate_large_dataset() -> Result<(), Box<dyn Error>> {
    const RAW_COUNT: usize = 600;
    const INTERMEDIATE_COUNT: usize = 200;
    const PRODUCT_COUNT: usize = 2000;

    let dir = Path::new("tests/fixtures/datasets/large");
    fs::create_dir_all(dir)?;

    let rm = |i: usize| format!("RM{:04}", i % RAW_COUNT);
    let int = |i: usize| format!("INT{:03}", i % INTERMEDIATE_COUNT);

    write_file(
        &dir.join("stock.csv"),
        STOCK_HEADER,
        (0..RAW_COUNT)
            .filter(|i| i % 7 != 0)
            .map(|i| stock_row(&rm(i), &format!("Raw material {}", i), i)),
    )?;

    let mut history = Vec::new();
    for i in 0..INTERMEDIATE_COUNT {
        let parent = int(i);
        let parent_desc = format!("Intermediate {}", i);
        for b in 0..3 {
            let batch = format!("IB{:03}-{}", i, b);
            for k in 0..(4 + (i + b) % 3) {
                let code = rm(i * 13 + b * 5 + k * 31);
                history.push(WeighRecord::new(&code, "", &batch, &parent, &parent_desc));
            }
            if i % 10 == 9 && b == 0 {
                history.push(WeighRecord::new(&int(i - 1), "", &batch, &parent, &parent_desc));
            }
        }
    }
    for p in 0..PRODUCT_COUNT {
        let parent = format!("FG{:05}", p);
        let parent_desc = format!("Finished good {}", p);
        for b in 0..2 {
            let batch = format!("FB{:05}-{}", p, b);
            history.push(WeighRecord::new(&int(p * 3 + b), "", &batch, &parent, &parent_desc));
            for k in 0..3 {
                let code = rm(p * 7 + b * 11 + k * 97);
                history.push(WeighRecord::new(&code, "", &batch, &parent, &parent_desc));
            }
        }
    }
    let history_rows = write_file(
        &dir.join("history.csv"),
        HISTORY_HEADER,
        history.iter().enumerate().map(|(i, r)| r.to_row(i)),
    )?;

    write_file(
        &dir.join("targets.csv"),
        TARGET_HEADER,
        (0..PRODUCT_COUNT).map(|p| {
            vec![
                format!("FG{:05}", p),
                format!("Finished good {}", p),
                format!("{}", 100 + p % 900),
                format!("{}", 25 + p % 200),
            ]
        }),
    )?;

    println!(
        "✓ 生成 large/ ({} 个目标, {} 条称量记录)",
        PRODUCT_COUNT, history_rows
    );
    Ok(())
}

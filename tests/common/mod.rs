#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const INVENTORY_HEADER: &str = "Date,StoreName,ProductName,Category,OpeningStock,ReceivedQty,SoldQty,ClosingStock,ForecastSales,ActualSales,ForecastError,ReorderLevel";

/// Small upload covering two stores, two categories and two months.
pub const INVENTORY_CSV: &str = "\
Date,StoreName,ProductName,Category,OpeningStock,ReceivedQty,SoldQty,ClosingStock,ForecastSales,ActualSales,ForecastError,ReorderLevel
2024-02-03,North,Soap,Home,40,10,20,30,120,110,8,25
2024-01-05,North,Rice,Food,25,5,22,8,90,95,-6,12
2024-01-09,South,Soap,Home,15,0,12,3,60,40,33,10
2024-02-11,South,Tea,Food,30,20,18,32,70,75,-7,15
2024-01-21,North,Tea,Food,12,0,9,n/a,50,52,4,6
";

pub const FORECAST_JSON: &str = r#"[
  {"date":"2024-03-01","storeId":"S1","productId":"P1","actual":120,"predicted":100,"error":16.667},
  {"date":"2024-03-01","storeId":"S2","productId":"P2","actual":80,"predicted":90,"error":-12.5},
  {"date":"2024-03-02","storeId":"S1","productId":"P1","actual":110,"predicted":100,"error":9.091},
  {"date":"2024-03-02","storeId":"S2","productId":"P3","actual":50,"predicted":40,"error":20.2}
]"#;

/// One comma-joined inventory line with the given keys and numbers.
pub fn inventory_line(
    date: &str,
    store: &str,
    product: &str,
    category: &str,
    closing: f64,
    reorder: f64,
) -> String {
    format!("{date},{store},{product},{category},10,2,4,{closing},20,18,5,{reorder}")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

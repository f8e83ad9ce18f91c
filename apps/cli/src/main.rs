use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use env_logger::{Builder, Env};
use glosscheck_core::{
    apply_edit, diff_tables, reconcile_sources, ColumnMapping, ColumnOverrides, ColumnRole,
    CompareColumn, CompareRecord, MatchState, MismatchCounts, RecordFilter,
};
use glosscheck_settings::{SourceAlias, Storage, StorageLocator};
use glosscheck_sources::{
    export_versioned, load_sources, read_compare_records, read_table, write_compare_csv,
    write_compare_xlsx, write_diff_csv, SourcePaths,
};

const FILE_TIMESTAMP: &str = "%Y%m%d_%H%M%S";
const EDIT_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";
const EXPORT_BASE_NAME: &str = "glossary_compare";

#[derive(Parser)]
#[command(
    name = "glosscheck-cli",
    about = "Reconcile a translation dictionary against ko/en/ru JSON language files",
    author,
    version
)]
struct Cli {
    /// 指定儲存資料夾；覆寫環境變數與設定檔。 / Storage directory; overrides the environment and config file.
    #[arg(long, global = true, value_name = "PATH")]
    storage_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 顯示字典表自動對應的欄位。 / Show which dictionary headers were picked for each column.
    Columns(ColumnsArgs),
    /// 比對字典與 JSON 語系檔。 / Compare the dictionary against the JSON language files.
    Compare(CompareArgs),
    /// 比較兩份匯出的比對表。 / Report changes between two exported compare tables.
    Diff(DiffArgs),
    /// 修改匯出比對表中的一格。 / Edit one cell of an exported compare table.
    Edit(EditArgs),
    /// 檢視或設定儲存資料夾。 / Show or set the storage directory.
    #[command(subcommand)]
    Storage(StorageCommand),
}

#[derive(Args)]
struct ColumnsArgs {
    /// 字典檔（CSV 或 TSV）。 / Dictionary file (CSV or TSV).
    #[arg(value_name = "DICTIONARY")]
    dictionary: PathBuf,
}

#[derive(Args)]
struct CompareArgs {
    /// 字典檔（CSV 或 TSV）。 / Dictionary file (CSV or TSV).
    #[arg(long, value_name = "PATH")]
    dictionary: Option<PathBuf>,

    /// 韓文 JSON。 / Korean JSON file.
    #[arg(long, value_name = "PATH")]
    ko: Option<PathBuf>,

    /// 俄文 JSON。 / Russian JSON file.
    #[arg(long, value_name = "PATH")]
    ru: Option<PathBuf>,

    /// 英文 JSON。 / English JSON file.
    #[arg(long, value_name = "PATH")]
    en: Option<PathBuf>,

    /// 缺少的輸入改用已儲存的來源檔。 / Fill missing inputs from saved sources.
    #[arg(long)]
    use_saved: bool,

    /// 加入只存在於 en.json 的鍵。 / Add rows for keys found only in en.json.
    #[arg(long)]
    include_en_keys: bool,

    /// 指定模組欄位標頭。 / Header of the module column.
    #[arg(long, value_name = "HEADER")]
    module_col: Option<String>,

    /// 指定英文欄位標頭。 / Header of the English column.
    #[arg(long, value_name = "HEADER")]
    english_col: Option<String>,

    /// 指定韓文欄位標頭。 / Header of the Korean column.
    #[arg(long, value_name = "HEADER")]
    korean_col: Option<String>,

    /// 指定俄文欄位標頭。 / Header of the Russian column.
    #[arg(long, value_name = "HEADER")]
    russian_col: Option<String>,

    /// 輸出 CSV 路徑。 / Write the result as CSV.
    #[arg(long, value_name = "OUT")]
    csv: Option<PathBuf>,

    /// 輸出 XLSX 路徑。 / Write the result as XLSX.
    #[arg(long, value_name = "OUT")]
    xlsx: Option<PathBuf>,

    /// 以版本號匯出到匯出資料夾。 / Write a versioned CSV and XLSX into the export directory.
    #[arg(long)]
    export: bool,

    /// 將輸入檔保存到儲存資料夾。 / Keep copies of the inputs in the storage directory.
    #[arg(long)]
    save_sources: bool,

    /// 依 KO 結果篩選（Y、N、no-file）。 / Keep rows with this KO_Match state.
    #[arg(long, value_name = "STATE")]
    ko_match: Option<MatchState>,

    /// 依 EN 結果篩選。 / Keep rows with this EN_Match state.
    #[arg(long, value_name = "STATE")]
    en_match: Option<MatchState>,

    /// 依 RU 結果篩選。 / Keep rows with this RU_Match state.
    #[arg(long, value_name = "STATE")]
    ru_match: Option<MatchState>,

    /// 依整體結果篩選。 / Keep rows with this Overall_Match state.
    #[arg(long, value_name = "STATE")]
    overall: Option<MatchState>,

    /// 全文搜尋（不分大小寫）。 / Keep rows where any cell contains this text.
    #[arg(long, value_name = "TEXT")]
    query: Option<String>,
}

#[derive(Args)]
struct DiffArgs {
    /// 基準比對表。 / Baseline compare table.
    #[arg(long, value_name = "PATH")]
    baseline: PathBuf,

    /// 目前比對表。 / Current compare table.
    #[arg(long, value_name = "PATH")]
    current: PathBuf,

    /// 將差異寫成 CSV。 / Write the change log as CSV instead of printing it.
    #[arg(long, value_name = "OUT")]
    csv: Option<PathBuf>,
}

#[derive(Args)]
struct EditArgs {
    /// 匯出的比對 CSV。 / Exported compare CSV.
    #[arg(long, value_name = "PATH")]
    table: PathBuf,

    /// 要修改的 Compare Key。 / Compare Key of the row to edit.
    #[arg(long, value_name = "KEY")]
    key: String,

    /// 欄位標頭。 / Header of the column to edit.
    #[arg(long, value_name = "HEADER")]
    column: String,

    /// 新的值。 / New cell value.
    #[arg(long, value_name = "TEXT")]
    value: String,

    /// 輸出路徑；預設覆寫原檔。 / Output path; defaults to rewriting the table.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum StorageCommand {
    /// 顯示目前的儲存與匯出資料夾。 / Print the storage and export directories.
    Show,
    /// 保存新的儲存資料夾。 / Persist a new storage directory.
    Set(StorageSetArgs),
}

#[derive(Args)]
struct StorageSetArgs {
    /// 新的儲存資料夾。 / New storage directory.
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

fn main() {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        storage_dir,
        command,
    } = Cli::parse();
    match command {
        Commands::Columns(args) => execute_columns(args),
        Commands::Compare(args) => execute_compare(args, storage_dir.as_deref()),
        Commands::Diff(args) => execute_diff(args),
        Commands::Edit(args) => execute_edit(args),
        Commands::Storage(subcommand) => execute_storage_command(subcommand, storage_dir.as_deref()),
    }
}

fn resolve_storage(preferred: Option<&Path>) -> Result<Storage> {
    StorageLocator::from_env()
        .resolve(preferred)
        .context("failed to prepare the storage directory")
}

fn require_existing(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{what} '{}' does not exist", path.display());
    }
    Ok(())
}

fn execute_columns(args: ColumnsArgs) -> Result<()> {
    require_existing(&args.dictionary, "dictionary")?;
    let table = read_table(&args.dictionary)?;
    let guessed = ColumnMapping::guess(table.headers());
    for role in ColumnRole::ALL {
        println!("{role}: {}", guessed.get(role).unwrap_or("-"));
    }
    Ok(())
}

fn column_overrides(args: &CompareArgs) -> ColumnOverrides {
    ColumnOverrides {
        module: args.module_col.clone(),
        english: args.english_col.clone(),
        korean: args.korean_col.clone(),
        russian: args.russian_col.clone(),
    }
}

fn record_filter(args: &CompareArgs) -> RecordFilter {
    RecordFilter {
        ko: args.ko_match,
        en: args.en_match,
        ru: args.ru_match,
        overall: args.overall,
        query: args.query.clone(),
    }
}

fn source_slots(paths: &mut SourcePaths) -> [(SourceAlias, &mut Option<PathBuf>); 4] {
    [
        (SourceAlias::Dictionary, &mut paths.dictionary),
        (SourceAlias::Ko, &mut paths.ko),
        (SourceAlias::Ru, &mut paths.ru),
        (SourceAlias::En, &mut paths.en),
    ]
}

fn execute_compare(args: CompareArgs, storage_dir: Option<&Path>) -> Result<()> {
    let mut paths = SourcePaths {
        dictionary: args.dictionary.clone(),
        ko: args.ko.clone(),
        ru: args.ru.clone(),
        en: args.en.clone(),
    };
    let needs_storage = args.use_saved || args.save_sources || args.export;
    let storage = if needs_storage {
        Some(resolve_storage(storage_dir)?)
    } else {
        None
    };
    let timestamp = Local::now().format(FILE_TIMESTAMP).to_string();

    if let Some(storage) = &storage {
        if args.save_sources {
            for (alias, slot) in source_slots(&mut paths) {
                if let Some(path) = slot.as_ref().filter(|path| path.exists()) {
                    storage
                        .store_source(alias, path, &timestamp)
                        .with_context(|| format!("failed to save {}", path.display()))?;
                }
            }
        }
        if args.use_saved {
            for (alias, slot) in source_slots(&mut paths) {
                if slot.is_none() {
                    *slot = storage.saved_source(alias);
                    if let Some(path) = slot.as_ref() {
                        log::info!("using saved {alias}: {}", path.display());
                    }
                }
            }
        }
    }

    let dictionary_path = paths
        .dictionary
        .clone()
        .ok_or_else(|| anyhow!("no dictionary given; pass --dictionary or --use-saved"))?;
    require_existing(&dictionary_path, "dictionary")?;

    let loaded = load_sources(&paths)?;
    let table = loaded
        .dictionary
        .as_ref()
        .ok_or_else(|| anyhow!("dictionary '{}' could not be read", dictionary_path.display()))?;
    let mapping = ColumnMapping::resolve(table.headers(), &column_overrides(&args))
        .with_context(|| format!("failed to map columns of {}", dictionary_path.display()))?;
    let (records, report) = reconcile_sources(table, &mapping, &loaded.maps(), args.include_en_keys);

    println!("{report}");
    println!("{}", MismatchCounts::from_records(&records));

    let filter = record_filter(&args);
    let selected: Vec<CompareRecord> = filter.apply(&records).into_iter().cloned().collect();
    if !filter.is_empty() {
        println!("{} of {} rows match the filter", selected.len(), records.len());
        for record in &selected {
            print_record(record);
        }
    }

    if let Some(path) = &args.csv {
        write_compare_csv(path, &selected)?;
        println!("Wrote CSV to {}", path.display());
    }
    if let Some(path) = &args.xlsx {
        write_compare_xlsx(path, &selected)?;
        println!("Wrote XLSX to {}", path.display());
    }
    if args.export {
        if let Some(storage) = &storage {
            let version = storage.reserve_next_version()?;
            let dir = storage.export_dir()?;
            let export = export_versioned(
                &selected,
                &dir,
                EXPORT_BASE_NAME,
                &version.to_string(),
                &timestamp,
            )?;
            println!("Exported v{version} to {}", export.csv.display());
            println!("Exported v{version} to {}", export.xlsx.display());
        }
    }
    Ok(())
}

fn print_record(record: &CompareRecord) {
    println!(
        "  [{}] {} ({}) KO={} EN={} RU={} overall={}",
        record.seq,
        record.key,
        record.module,
        record.ko_match,
        record.en_match,
        record.ru_match,
        record.overall_match
    );
}

fn execute_diff(args: DiffArgs) -> Result<()> {
    require_existing(&args.baseline, "baseline")?;
    require_existing(&args.current, "current table")?;
    let baseline = read_table(&args.baseline)?;
    let current = read_table(&args.current)?;
    let changes = diff_tables(&baseline, &current);

    if let Some(path) = &args.csv {
        write_diff_csv(path, &changes)?;
        println!("Wrote {} changes to {}", changes.len(), path.display());
        return Ok(());
    }
    if changes.is_empty() {
        println!("No changes.");
        return Ok(());
    }
    println!("{} changes:", changes.len());
    for change in &changes {
        println!(
            "  {}\t{}\t{}\t{}\t{}",
            change.key, change.change, change.column, change.old, change.new
        );
    }
    Ok(())
}

fn execute_edit(args: EditArgs) -> Result<()> {
    require_existing(&args.table, "table")?;
    let column = CompareColumn::from_header(&args.column)
        .ok_or_else(|| anyhow!("unknown column '{}'", args.column))?;
    let mut records = read_compare_records(&args.table)?;
    let key = args.key.trim();
    let record = records
        .iter_mut()
        .find(|record| record.key == key)
        .ok_or_else(|| anyhow!("no row with key '{key}' in {}", args.table.display()))?;

    let edited_at = Local::now().format(EDIT_TIMESTAMP).to_string();
    apply_edit(record, column, &args.value, &edited_at)?;
    println!(
        "Edited '{}': KO={} EN={} RU={} overall={}",
        record.key, record.ko_match, record.en_match, record.ru_match, record.overall_match
    );

    let output = args.output.unwrap_or(args.table);
    write_compare_csv(&output, &records)?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn execute_storage_command(command: StorageCommand, storage_dir: Option<&Path>) -> Result<()> {
    match command {
        StorageCommand::Show => {
            let storage = resolve_storage(storage_dir)?;
            println!("Storage: {}", storage.root().display());
            println!("Exports: {}", storage.export_dir()?.display());
            for alias in SourceAlias::ALL {
                if let Some(path) = storage.saved_source(alias) {
                    println!("  {alias}: {}", path.display());
                }
            }
            Ok(())
        }
        StorageCommand::Set(args) => {
            let storage = StorageLocator::from_env()
                .set_storage_dir(&args.path)
                .with_context(|| format!("failed to set storage to {}", args.path.display()))?;
            println!("Storage set to {}", storage.root().display());
            Ok(())
        }
    }
}

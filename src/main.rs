// ==========================================
// Seguimiento de pedidos - CLI entry point
// ==========================================
// Front door for the dashboards' backend: runs one query cycle per
// invocation and prints tables plus chart-ready JSON. Every failure
// surfaces as a localized message; a bad query never takes the
// process down with a panic.
// ==========================================

use chrono::{Local, NaiveDate};
use garment_progress::api::progress_api::{OrderProgressRequest, WindowQuery};
use garment_progress::app::{get_default_db_path, AppState, SessionState};
use garment_progress::domain::plan::PlanRecord;
use garment_progress::domain::schedule::ExtraDayOffsets;
use garment_progress::importer::{ExpandOptions, RowExpander, UniversalSheetParser};

fn main() {
    garment_progress::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", garment_progress::APP_NAME);
    tracing::info!("version: {}", garment_progress::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        return;
    }

    let exit_code = match run(&args) {
        Ok(()) => 0,
        Err(message) => {
            eprintln!("{}", message);
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(args: &[String]) -> Result<(), String> {
    let state = AppState::new(get_default_db_path()).map_err(|e| {
        tracing::error!("startup failed: {}", e);
        garment_progress::i18n::t("errors.connectivity")
    })?;

    if let Ok(locale) = state.config.get_locale() {
        garment_progress::i18n::set_locale(&locale);
    }

    let today = Local::now().date_naive();

    match args[0].as_str() {
        "order" => cmd_order(&state, &args[1..], today),
        "orders" => cmd_orders(&state, &args[1..], today),
        "window" => cmd_window(&state, &args[1..], today),
        "plan" => cmd_plan(&state, &args[1..]),
        "expand" => cmd_expand(&args[1..]),
        other => {
            print_usage();
            Err(format!("unknown command: {}", other))
        }
    }
}

// ==========================================
// order <PEDIDO> [--fabric N] [--piece N] [--garment N]
//                [--placement YYYY-MM-DD] [--delivery YYYY-MM-DD]
// ==========================================
fn cmd_order(state: &AppState, args: &[String], today: NaiveDate) -> Result<(), String> {
    let order_code = args
        .first()
        .ok_or_else(|| "usage: garment-progress order <PEDIDO> [options]".to_string())?;

    let mut request = OrderProgressRequest::for_order(order_code.clone());
    let mut offsets = ExtraDayOffsets::default();
    let mut iter = args[1..].iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("missing value for {}", flag))?;
        match flag.as_str() {
            "--fabric" => offsets.fabric_days = parse_days(value)?,
            "--piece" => offsets.piece_days = parse_days(value)?,
            "--garment" => offsets.garment_days = parse_days(value)?,
            "--placement" => request.placement_override = Some(parse_date(value)?),
            "--delivery" => request.delivery_override = Some(parse_date(value)?),
            other => return Err(format!("unknown option: {}", other)),
        }
    }
    request.offsets = offsets;

    let report = block_on(state.progress_api.order_progress(&request, today))
        .map_err(|e| e.user_message())?;

    println!(
        "Pedido: {}  Cliente: {}",
        report.order.order_code,
        report.order.client_name.as_deref().unwrap_or("-")
    );
    println!(
        "{:<12} {:>12} {:>12} {:>12} {:>12} {:>9}",
        "PROCESO", "INI_PLAN", "FIN_PLAN", "INI_REAL", "FIN_REAL", "AVANCE"
    );
    for row in &report.rows {
        println!(
            "{:<12} {:>12} {:>12} {:>12} {:>12} {:>8.1}%",
            row.phase.label(),
            row.planned_start,
            row.planned_finish,
            row.actual_start.map(|d| d.date().to_string()).unwrap_or_else(|| "-".into()),
            row.actual_finish.map(|d| d.date().to_string()).unwrap_or_else(|| "-".into()),
            row.completion_fraction * 100.0,
        );
    }

    let json = report
        .gantt
        .to_json()
        .map_err(|e| format!("cannot serialize chart: {}", e))?;
    println!("{}", json);
    Ok(())
}

// ==========================================
// orders <PEDIDO>... - the accumulated working set
// ==========================================
fn cmd_orders(state: &AppState, args: &[String], today: NaiveDate) -> Result<(), String> {
    if args.is_empty() {
        return Err("usage: garment-progress orders <PEDIDO> [<PEDIDO>...]".to_string());
    }

    // duplicates on the command line collapse like they do in the UI
    let mut session = SessionState::new();
    for code in args {
        if !session.add_order(code) {
            tracing::debug!(order = %code, "ignoring duplicate/blank order code");
        }
    }

    for code in session.orders() {
        let request = OrderProgressRequest::for_order(code.clone());
        match block_on(state.progress_api.order_progress(&request, today)) {
            Ok(report) => {
                println!(
                    "{}  {}  {} dias",
                    report.order.order_code,
                    report.order.client_name.as_deref().unwrap_or("-"),
                    report.order.lead_time_days
                );
                for row in &report.rows {
                    println!(
                        "  {:<12} {} .. {}  avance={:.1}%",
                        row.phase.label(),
                        row.planned_start,
                        row.planned_finish,
                        row.completion_fraction * 100.0
                    );
                }
            }
            // one bad order must not sink the rest of the set
            Err(e) => eprintln!("{}", e.user_message()),
        }
    }
    Ok(())
}

// ==========================================
// window <FROM> <TO> [--clients a,b,c]
// ==========================================
fn cmd_window(state: &AppState, args: &[String], today: NaiveDate) -> Result<(), String> {
    let usage = "usage: garment-progress window <FROM> <TO> [--clients a,b,c]";
    let from = parse_date(args.first().ok_or_else(|| usage.to_string())?)?;
    let to = parse_date(args.get(1).ok_or_else(|| usage.to_string())?)?;

    let mut clients = Vec::new();
    let mut iter = args[2..].iter();
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--clients" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "missing value for --clients".to_string())?;
                clients = value
                    .split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect();
            }
            other => return Err(format!("unknown option: {}", other)),
        }
    }

    let query = WindowQuery { from, to, clients };
    let report =
        block_on(state.progress_api.window_progress(&query, today)).map_err(|e| e.user_message())?;

    println!("Pedidos: {}  (omitidos: {})", report.orders.len(), report.skipped.len());
    for order_report in &report.orders {
        println!(
            "  {}  {}  {} dias",
            order_report.order.order_code,
            order_report.order.client_name.as_deref().unwrap_or("-"),
            order_report.order.lead_time_days
        );
    }

    if !report.lagging.is_empty() {
        println!("Procesos atrasados:");
        for row in &report.lagging {
            println!(
                "  {} {:<12} avance={}  dias_restantes={}",
                row.order_id,
                row.phase.label(),
                row.completion_pct
                    .map(|p| format!("{:.0}%", p))
                    .unwrap_or_else(|| "-".into()),
                row.days_remaining
            );
        }
    }

    println!("RESUMEN:");
    for row in &report.summary {
        println!(
            "  {:<12} {} .. {}  avance={:.1}%",
            row.phase.label(),
            row.planned_start,
            row.planned_finish,
            row.completion_fraction * 100.0
        );
    }
    Ok(())
}

// ==========================================
// plan list | plan get <id> | plan delete <id>
// plan create --file <record.json> | plan update --file <record.json>
// ==========================================
fn cmd_plan(state: &AppState, args: &[String]) -> Result<(), String> {
    let usage = "usage: garment-progress plan <list|get|create|update|delete> ...";
    match args.first().map(String::as_str) {
        Some("list") => {
            let records = state.plan_api.list().map_err(|e| e.user_message())?;
            for record in records {
                println!("{}", summarize_plan(&record));
            }
            Ok(())
        }
        Some("get") => {
            let id = args.get(1).ok_or_else(|| usage.to_string())?;
            match state.plan_api.get(id).map_err(|e| e.user_message())? {
                Some(record) => {
                    let json = serde_json::to_string_pretty(&record)
                        .map_err(|e| format!("cannot serialize record: {}", e))?;
                    println!("{}", json);
                    Ok(())
                }
                None => Err(garment_progress::i18n::t_with_args(
                    "errors.not_found",
                    &[("detail", id)],
                )),
            }
        }
        Some("create") | Some("update") => {
            let record = read_plan_record(&args[1..])?;
            if args[0] == "create" {
                state.plan_api.create(&record).map_err(|e| e.user_message())?;
                println!("{}", garment_progress::i18n::t("status.plan_created"));
            } else {
                state.plan_api.update(&record).map_err(|e| e.user_message())?;
                println!("{}", garment_progress::i18n::t("status.plan_updated"));
            }
            Ok(())
        }
        Some("delete") => {
            let id = args.get(1).ok_or_else(|| usage.to_string())?;
            state.plan_api.delete(id).map_err(|e| e.user_message())?;
            println!("{}", garment_progress::i18n::t("status.plan_deleted"));
            Ok(())
        }
        _ => Err(usage.to_string()),
    }
}

// ==========================================
// expand <file> --info A,B --sizes S,M,L [--extra S2,M2]
//        [--uplift 3] [--multiple 0] [--divisor 1] [--out out.csv]
// ==========================================
fn cmd_expand(args: &[String]) -> Result<(), String> {
    let usage = "usage: garment-progress expand <file> --info A,B --sizes S,M,L [options]";
    let file = args.first().ok_or_else(|| usage.to_string())?;

    let mut options = ExpandOptions {
        info_columns: Vec::new(),
        size_columns: Vec::new(),
        extra_columns: Vec::new(),
        uplift_pct: 3,
        multiple: 0,
        divisor: 1,
    };
    let mut out_path: Option<String> = None;

    let mut iter = args[1..].iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("missing value for {}", flag))?;
        match flag.as_str() {
            "--info" => options.info_columns = split_list(value),
            "--sizes" => options.size_columns = split_list(value),
            "--extra" => options.extra_columns = split_list(value),
            "--uplift" => options.uplift_pct = parse_u32(value)?,
            "--multiple" => options.multiple = parse_u32(value)?,
            "--divisor" => options.divisor = parse_u32(value)?,
            "--out" => out_path = Some(value.clone()),
            other => return Err(format!("unknown option: {}", other)),
        }
    }

    let sheet = UniversalSheetParser
        .parse(file)
        .map_err(|e| e.to_string())?;
    let expander = RowExpander::new();
    let table = expander.expand(&sheet, &options).map_err(|e| e.to_string())?;
    println!("registros: {}", table.rows.len());

    match out_path {
        Some(path) => {
            let file = std::fs::File::create(&path).map_err(|e| e.to_string())?;
            expander.write_csv(&table, file).map_err(|e| e.to_string())?;
            println!("escrito: {}", path);
        }
        None => {
            let mut buffer = Vec::new();
            expander.write_csv(&table, &mut buffer).map_err(|e| e.to_string())?;
            print!("{}", String::from_utf8_lossy(&buffer));
        }
    }
    Ok(())
}

// ==========================================
// helpers
// ==========================================

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime")
        .block_on(future)
}

fn read_plan_record(args: &[String]) -> Result<PlanRecord, String> {
    match args {
        [flag, path] if flag == "--file" => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path, e))?;
            serde_json::from_str(&text).map_err(|e| format!("invalid plan record: {}", e))
        }
        _ => Err("expected --file <record.json>".to_string()),
    }
}

fn summarize_plan(record: &PlanRecord) -> String {
    format!(
        "{}  colocacion={}  entrega={}",
        record.order_id,
        record
            .placement_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into()),
        record
            .delivery_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into()),
    )
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date (expected YYYY-MM-DD): {}", value))
}

fn parse_days(value: &str) -> Result<i64, String> {
    let days = value
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid day count: {}", value))?;
    if days < 0 {
        return Err(format!("day count cannot be negative: {}", value));
    }
    Ok(days)
}

fn parse_u32(value: &str) -> Result<u32, String> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid number: {}", value))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn print_usage() {
    println!("{} v{}", garment_progress::APP_NAME, garment_progress::VERSION);
    println!();
    println!("commands:");
    println!("  order <PEDIDO> [--fabric N] [--piece N] [--garment N]");
    println!("                 [--placement YYYY-MM-DD] [--delivery YYYY-MM-DD]");
    println!("  orders <PEDIDO> [<PEDIDO>...]");
    println!("  window <FROM> <TO> [--clients a,b,c]");
    println!("  plan <list|get|create|update|delete> ...");
    println!("  expand <file> --info A,B --sizes S,M,L [--extra S2,M2]");
    println!("                [--uplift N] [--multiple N] [--divisor N] [--out file.csv]");
}

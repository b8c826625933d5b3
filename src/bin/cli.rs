use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame};
use std::io::{self, Write};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;
use unit_pricing::assistant::{AssistantRequest, build_prompt};
use unit_pricing::{
    AllocationPlan, Complexity, MAX_PERIODS, Overhead, PlanningSession, PrerequisiteGraph,
    PricingMode, Quote, RateConfig, SimulationRequest, TaskCatalog, TaskModifiers, Tier,
    format_currency, format_menu, format_units, load_catalog_from_csv, load_rates_from_json,
    load_session_from_json, quote, render_sprint_summary, save_log_to_csv,
    save_proposal_markdown, save_rates_to_json, save_session_to_json, simulate,
    simulation_menu, validate_periods,
};

fn render_cell(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Float64(v) => format!("{v:.2}"),
        AnyValue::String(s) => s.to_string(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| render_cell(&av)).unwrap_or_default())
            .collect::<Vec<_>>();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(value.chars().count());
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  rates                              Show rate configuration\n  rate <tier> <value>                Set hourly rate (director|leadership|coordinator)\n  overhead pct <value>               Set overhead as a percentage\n  overhead mult <value>              Set overhead as a multiplier\n  unit-price <value>                 Set the dollar value of one unit\n  mode <exact|partner>               Set pricing mode\n  floor <low|medium|high> <value>    Set partner-mode complexity floor\n  rates save|load <json_path>        Persist or load rate configuration\n  domains                            List task domains\n  catalog [domain_no]                List tasks (optionally for one domain)\n  catalog load <csv_path>            Replace the task library from CSV\n  quote <task_no> [additional] [complexity] [fee=<amount>]\n                                     Cost a task without logging it\n  add <task_no> [additional] [complexity] [fee=<amount>] [phase...]\n                                     Cost a task and add it to the sprint log\n  summary <task_no> [name...]        Print a sprint summary for a task\n  log                                Show the sprint log\n  remove <position>                  Remove a sprint log entry (1-based)\n  scope show                         Show engagement scope\n  scope name|partner|theme <text...> Update scope text fields\n  scope start <YYYY-MM-DD>           Update engagement start date\n  scope periods <n>                  Update number of quarterly periods\n  scope budget <units>               Update total unit budget\n  simulate [units] [periods] [theme...]\n                                     Greedy allocation across periods\n  prereqs                            List logged tasks with missing prerequisites\n  menu                               Show the planning assistant task menu\n  ask <goal...>                      Ask the planning assistant for suggestions\n  export csv|md <path>               Export sprint log as CSV or proposal markdown\n  save <json_path>                   Save the session\n  load <json_path>                   Load a saved session\n  quit|exit                          Exit"
    );
}

fn print_rates(rates: &RateConfig) {
    for tier in Tier::ALL {
        println!(
            "{:<21}: {}/h",
            tier.label(),
            format_currency(rates.tier_rates.get(tier))
        );
    }
    println!(
        "Overhead             : {} ({:.2}%)",
        rates.overhead,
        rates.overhead.as_percent()
    );
    println!("Unit price           : {}", format_currency(rates.unit_price));
    println!("Pricing mode         : {}", rates.pricing_mode.as_str());
    let floors = &rates.complexity_floors;
    println!(
        "Complexity floors    : low={} medium={} high={}",
        floors.low, floors.medium, floors.high
    );
}

fn print_scope(session: &PlanningSession) {
    let scope = &session.scope;
    println!("Project name : {}", scope.project_name);
    println!("Partner      : {}", scope.partner_name);
    println!("Start date   : {}", scope.start_date);
    println!("Periods      : {}", scope.periods);
    println!(
        "Unit budget  : {}",
        scope
            .total_units
            .map(format_units)
            .unwrap_or_else(|| "-".to_string())
    );
    println!("Theme        : {}", scope.theme.as_deref().unwrap_or("-"));
}

fn print_quote(quote: &Quote) {
    let b = &quote.breakdown;
    println!("Task          : {} ({})", quote.task_name, quote.domain);
    println!("Description   : {}", quote.description);
    println!("Staff cost    : {}", format_currency(b.staff_cost));
    println!("Additional    : {}", format_currency(b.additional_costs));
    if b.fixed_fees > 0.0 {
        println!("Fixed fees    : {}", format_currency(b.fixed_fees));
    }
    println!("Overhead      : {} (x{})", format_currency(b.overhead_cost()), b.overhead_multiplier);
    println!("Total cost    : {}", format_currency(b.total_cost));
    println!("Exact units   : {}", format_units(b.units));
    if quote.pricing_mode == PricingMode::Partner {
        println!(
            "Partner units : {} ({} complexity)",
            format_units(quote.display_units),
            quote.complexity
        );
    }
}

fn print_log(session: &PlanningSession) {
    if session.log.is_empty() {
        println!("Sprint log is empty.");
        return;
    }
    match session.log.to_dataframe() {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error rendering log: {}", e),
    }
    println!(
        "Total: {} units, {}",
        format_units(session.log.total_units()),
        format_currency(session.log.total_cost())
    );
}

fn print_plan(plan: &AllocationPlan, session: &PlanningSession) {
    match plan.to_dataframe() {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error rendering plan: {}", e),
    }
    for (idx, used) in plan.period_totals.iter().enumerate() {
        let period = idx as u32 + 1;
        println!(
            "Period {} ({}): {} / {} units",
            period,
            AllocationPlan::period_label(period, session.scope.start_date),
            format_units(*used),
            format_units(plan.per_period_share)
        );
    }
    println!(
        "Used {} of {} units (avg {} per period) - {}",
        format_units(plan.total_used),
        format_units(plan.total_units),
        format_units(plan.avg_per_period),
        if plan.fits { "fits" } else { "over budget" }
    );
    if !plan.unassignable.is_empty() {
        println!(
            "Too large for any period: {}",
            plan.unassignable.join(", ")
        );
    }
}

fn parse_f64(value: &str, what: &str) -> Option<f64> {
    match value.trim_start_matches('$').parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            println!("Invalid {what}");
            None
        }
    }
}

/// Template position (1-based) followed by optional additional costs and complexity.
fn parse_quote_args<'a, I>(catalog: &TaskCatalog, parts: &mut I) -> Option<(usize, TaskModifiers)>
where
    I: Iterator<Item = &'a str>,
{
    let index = match parts.next().map(str::parse::<usize>) {
        Some(Ok(n)) if n >= 1 && n <= catalog.len() => n - 1,
        Some(_) => {
            println!("Invalid task number (see 'catalog')");
            return None;
        }
        None => return None,
    };
    let mut modifiers = TaskModifiers::default();
    if let Some(raw) = parts.next() {
        modifiers.additional_costs = Some(parse_f64(raw, "additional costs")?);
    }
    if let Some(raw) = parts.next() {
        match Complexity::from_str(raw) {
            Ok(complexity) => modifiers.complexity = complexity,
            Err(e) => {
                println!("{}", e);
                return None;
            }
        }
    }
    Some((index, modifiers))
}

/// Applies a change to a copy of the rates and keeps it only if it validates.
fn update_rates<F>(session: &mut PlanningSession, mutator: F)
where
    F: FnOnce(&mut RateConfig),
{
    let mut rates = session.rates.clone();
    mutator(&mut rates);
    match rates.validate() {
        Ok(()) => {
            session.rates = rates;
            print_rates(&session.rates);
        }
        Err(e) => println!("Error: {}", e),
    }
}

#[cfg(feature = "assistant")]
fn run_assistant(request: &AssistantRequest) {
    use unit_pricing::assistant::{HttpAssistant, ask};

    let assistant = match HttpAssistant::from_env() {
        Ok(a) => a,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };
    match ask(&assistant, request) {
        Ok(reply) => {
            println!("{}", reply.text);
            if reply.has_suggestions() {
                println!("\nStructured suggestions (best effort):");
                for s in &reply.suggestions {
                    println!("  {}: {} ({} units)", s.domain, s.task_name, format_units(s.units));
                }
            } else {
                println!("\nNo structured suggestions extracted.");
            }
        }
        Err(e) => println!("Assistant error: {}", e),
    }
}

#[cfg(not(feature = "assistant"))]
fn run_assistant(_request: &AssistantRequest) {
    println!("Rebuild with the `assistant` feature to enable the planning assistant.");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let mut catalog = TaskCatalog::default_library();
    let mut session = PlanningSession::default();

    println!("Unit Pricing Tool (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "rates" => match (parts.next(), parts.next()) {
                (None, _) => print_rates(&session.rates),
                (Some("save"), Some(path)) => match save_rates_to_json(&session.rates, path) {
                    Ok(_) => println!("Rates saved to {}.", path),
                    Err(e) => println!("Error saving rates: {}", e),
                },
                (Some("load"), Some(path)) => match load_rates_from_json(path) {
                    Ok(rates) => {
                        session.rates = rates;
                        println!("Rates loaded from {}.", path);
                        print_rates(&session.rates);
                    }
                    Err(e) => println!("Error loading rates: {}", e),
                },
                _ => println!("Usage: rates [save|load <json_path>]"),
            },
            "rate" => match (parts.next(), parts.next()) {
                (Some(tier_s), Some(value_s)) => {
                    let tier = match Tier::from_str(tier_s) {
                        Ok(t) => t,
                        Err(e) => {
                            println!("{}", e);
                            continue;
                        }
                    };
                    let Some(value) = parse_f64(value_s, "rate") else {
                        continue;
                    };
                    update_rates(&mut session, |rates| rates.tier_rates.set(tier, value));
                }
                _ => println!("Usage: rate <director|leadership|coordinator> <value>"),
            },
            "overhead" => match (parts.next(), parts.next()) {
                (Some(kind @ ("pct" | "mult")), Some(value_s)) => {
                    let Some(value) = parse_f64(value_s.trim_end_matches('%'), "overhead") else {
                        continue;
                    };
                    let overhead = if kind == "pct" {
                        Overhead::Percent(value)
                    } else {
                        Overhead::Multiplier(value)
                    };
                    update_rates(&mut session, |rates| rates.overhead = overhead);
                }
                _ => println!("Usage: overhead pct|mult <value>"),
            },
            "unit-price" => match parts.next() {
                Some(value_s) => {
                    let Some(value) = parse_f64(value_s, "unit price") else {
                        continue;
                    };
                    update_rates(&mut session, |rates| rates.unit_price = value);
                }
                None => println!("Usage: unit-price <value>"),
            },
            "mode" => match parts.next().map(PricingMode::from_str) {
                Some(Ok(mode)) => update_rates(&mut session, |rates| rates.pricing_mode = mode),
                Some(Err(e)) => println!("{}", e),
                None => println!("Usage: mode <exact|partner>"),
            },
            "floor" => match (parts.next(), parts.next()) {
                (Some(complexity_s), Some(value_s)) => {
                    let complexity = match Complexity::from_str(complexity_s) {
                        Ok(c) => c,
                        Err(e) => {
                            println!("{}", e);
                            continue;
                        }
                    };
                    let Some(value) = parse_f64(value_s, "floor") else {
                        continue;
                    };
                    update_rates(&mut session, |rates| {
                        rates.complexity_floors.set(complexity, value)
                    });
                }
                _ => println!("Usage: floor <low|medium|high> <value>"),
            },
            "domains" => {
                for (idx, domain) in catalog.domains().iter().enumerate() {
                    println!("  {:>2}. {}", idx + 1, domain);
                }
            }
            "catalog" => match parts.next() {
                Some("load") => match parts.next() {
                    Some(path) => match load_catalog_from_csv(path) {
                        Ok(loaded) => {
                            catalog = loaded;
                            println!("Loaded {} tasks from {}.", catalog.len(), path);
                        }
                        Err(e) => println!("Error loading catalog: {}", e),
                    },
                    None => println!("Usage: catalog load <csv_path>"),
                },
                filter => {
                    let domain = match filter.map(str::parse::<usize>) {
                        None => None,
                        Some(Ok(n)) if n >= 1 && n <= catalog.domains().len() => {
                            Some(catalog.domains()[n - 1].to_string())
                        }
                        Some(_) => {
                            println!("Invalid domain number (see 'domains')");
                            continue;
                        }
                    };
                    let df = match &domain {
                        Some(d) => catalog.domain_dataframe(d),
                        None => catalog.to_dataframe(),
                    };
                    match df {
                        Ok(df) => println!("{}", render_df_as_text_table(&df)),
                        Err(e) => println!("Error rendering catalog: {}", e),
                    }
                }
            },
            "quote" | "add" => {
                let (fees, positional): (Vec<&str>, Vec<&str>) =
                    parts.partition(|arg| arg.starts_with("fee="));
                let mut positional = positional.into_iter();
                let Some((index, mut modifiers)) = parse_quote_args(&catalog, &mut positional)
                else {
                    println!("Usage: {} <task_no> [additional] [complexity] [fee=<amount>]{}", cmd,
                        if cmd == "add" { " [phase...]" } else { "" });
                    continue;
                };
                if let Some(raw) = fees.last().and_then(|arg| arg.strip_prefix("fee=")) {
                    let Some(fee) = parse_f64(raw, "fixed fee") else {
                        continue;
                    };
                    modifiers = modifiers.with_fixed_fee(fee);
                }
                let rest: Vec<&str> = positional.collect();
                if !rest.is_empty() {
                    modifiers.phase = Some(rest.join(" "));
                }
                let Some(template) = catalog.get(index) else {
                    continue;
                };
                match quote(template, &modifiers, &session.rates) {
                    Ok(q) => {
                        print_quote(&q);
                        if cmd == "add" {
                            session.add_to_log(&q);
                            println!("Added '{}' to the sprint log.", q.task_name);
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "summary" => {
                let index = match parts.next().map(str::parse::<usize>) {
                    Some(Ok(n)) if n >= 1 && n <= catalog.len() => n - 1,
                    _ => {
                        println!("Usage: summary <task_no> [sprint name...]");
                        continue;
                    }
                };
                let name = parts.collect::<Vec<_>>().join(" ");
                let Some(template) = catalog.get(index) else {
                    continue;
                };
                match quote(template, &TaskModifiers::default(), &session.rates) {
                    Ok(q) => {
                        let name = (!name.is_empty()).then_some(name.as_str());
                        println!("{}", render_sprint_summary(&q, name));
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "log" => print_log(&session),
            "remove" => match parts.next().map(str::parse::<usize>) {
                Some(Ok(pos)) if pos >= 1 => match session.remove_from_log(pos - 1) {
                    Ok(entry) => {
                        println!("Removed '{}' from the sprint log.", entry.task_name);
                        print_log(&session);
                    }
                    Err(e) => println!("Error: {}", e),
                },
                Some(_) => println!("Invalid position"),
                None => println!("Usage: remove <position>"),
            },
            "scope" => match parts.next() {
                Some("show") | None => print_scope(&session),
                Some(field @ ("name" | "partner" | "theme")) => {
                    let text = parts.collect::<Vec<_>>().join(" ");
                    match field {
                        "name" if !text.is_empty() => session.scope.project_name = text,
                        "partner" => session.scope.partner_name = text,
                        "theme" => {
                            session.scope.theme = if text.is_empty() { None } else { Some(text) }
                        }
                        _ => {
                            println!("Usage: scope name <text...>");
                            continue;
                        }
                    }
                    print_scope(&session);
                }
                Some("start") => match parts.next().map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d")) {
                    Some(Ok(date)) => {
                        session.scope.start_date = date;
                        print_scope(&session);
                    }
                    _ => println!("Usage: scope start <YYYY-MM-DD>"),
                },
                Some("periods") => match parts.next().map(str::parse::<u32>) {
                    Some(Ok(n)) => match validate_periods(n) {
                        Ok(()) => {
                            session.scope.periods = n;
                            print_scope(&session);
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    _ => println!("Usage: scope periods <n> (1..={MAX_PERIODS})"),
                },
                Some("budget") => match parts.next().map(str::parse::<f64>) {
                    Some(Ok(units)) if units.is_finite() && units > 0.0 => {
                        session.scope.total_units = Some(units);
                        print_scope(&session);
                    }
                    _ => println!("Usage: scope budget <units> (units > 0)"),
                },
                Some(other) => {
                    println!("Unknown scope command '{}'.", other);
                    println!("Usage: scope show|name|partner|theme|start|periods|budget ...");
                }
            },
            "simulate" => {
                let units = match parts.next().map(str::parse::<f64>) {
                    Some(Ok(v)) => Some(v),
                    Some(Err(_)) => {
                        println!("Invalid units");
                        continue;
                    }
                    None => session.scope.total_units,
                };
                let periods = match parts.next().map(str::parse::<u32>) {
                    Some(Ok(v)) => v,
                    Some(Err(_)) => {
                        println!("Invalid periods");
                        continue;
                    }
                    None => session.scope.periods,
                };
                let Some(units) = units else {
                    println!("Usage: simulate <units> [periods] [theme...] (or set 'scope budget')");
                    continue;
                };
                let theme = parts.collect::<Vec<_>>().join(" ");
                let mut request = SimulationRequest::new(units, periods);
                request.theme = if theme.is_empty() {
                    session.scope.theme.clone()
                } else {
                    Some(theme)
                };
                let plan = simulation_menu(&catalog, &session.rates)
                    .and_then(|menu| simulate(&menu, &request));
                match plan {
                    Ok(plan) => print_plan(&plan, &session),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "prereqs" => {
                let graph = PrerequisiteGraph::build(&catalog);
                let missing = graph.missing_for(&session.log);
                if missing.is_empty() {
                    println!("All prerequisites are in the sprint log.");
                }
                for m in missing {
                    println!("'{}' expects '{}' first.", m.task_name, m.prerequisite);
                }
            }
            "menu" => match format_menu(&catalog, &session.rates) {
                Ok(menu) => println!("{}", menu),
                Err(e) => println!("Error: {}", e),
            },
            "ask" => {
                let goal = parts.collect::<Vec<_>>().join(" ");
                if goal.is_empty() {
                    println!("Usage: ask <goal...>");
                    continue;
                }
                match format_menu(&catalog, &session.rates) {
                    Ok(menu) => run_assistant(&build_prompt(&goal, &menu, &session.scope)),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "export" => match (parts.next(), parts.next()) {
                (Some("csv"), Some(path)) => match save_log_to_csv(&session.log, path) {
                    Ok(_) => println!("Sprint log exported to {}.", path),
                    Err(e) => println!("Error exporting: {}", e),
                },
                (Some("md"), Some(path)) => match save_proposal_markdown(&session, path) {
                    Ok(_) => println!("Proposal exported to {}.", path),
                    Err(e) => println!("Error exporting: {}", e),
                },
                _ => println!("Usage: export csv|md <path>"),
            },
            "save" => match parts.next() {
                Some(path) => match save_session_to_json(&session, path) {
                    Ok(_) => println!("Session saved to {}.", path),
                    Err(e) => println!("Error saving session: {}", e),
                },
                None => println!("Usage: save <json_path>"),
            },
            "load" => match parts.next() {
                Some(path) => match load_session_from_json(path) {
                    Ok(loaded) => {
                        session = loaded;
                        println!("Session loaded from {}.", path);
                        print_log(&session);
                    }
                    Err(e) => println!("Error loading session: {}", e),
                },
                None => println!("Usage: load <json_path>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}

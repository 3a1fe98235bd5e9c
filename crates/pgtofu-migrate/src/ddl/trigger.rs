use crate::error::{Error, Result};
use crate::ident::{qualified_name, quote_identifier};
use crate::schema::{Trigger, TriggerEvent, TriggerLevel, TriggerTiming};

fn timing_str(t: TriggerTiming) -> &'static str {
    match t {
        TriggerTiming::Before => "BEFORE",
        TriggerTiming::After => "AFTER",
        TriggerTiming::InsteadOf => "INSTEAD OF",
    }
}

fn event_str(e: TriggerEvent) -> &'static str {
    match e {
        TriggerEvent::Insert => "INSERT",
        TriggerEvent::Update => "UPDATE",
        TriggerEvent::Delete => "DELETE",
        TriggerEvent::Truncate => "TRUNCATE",
    }
}

fn level_str(l: TriggerLevel) -> &'static str {
    match l {
        TriggerLevel::Row => "ROW",
        TriggerLevel::Statement => "STATEMENT",
    }
}

/// `CREATE TRIGGER name\n<timing> <events joined with OR> ON schema.table\nFOR EACH ROW|STATEMENT\n[WHEN (cond)]\nEXECUTE FUNCTION schema.UPPERFUNC()`.
pub fn format_trigger(trig: &Trigger) -> Result<String> {
    if trig.events.is_empty() {
        return Err(Error::InvalidOptions(format!(
            "trigger {} has no events",
            trig.name
        )));
    }
    let events = trig
        .events
        .iter()
        .map(|e| event_str(*e))
        .collect::<Vec<_>>()
        .join(" OR ");

    let func_schema = if trig.function_schema.is_empty() {
        "public"
    } else {
        &trig.function_schema
    };
    let func_target = format!(
        "{}.{}",
        quote_identifier(func_schema),
        trig.function_name.to_uppercase()
    );

    let mut s = format!(
        "CREATE TRIGGER {}\n{} {} ON {}\nFOR EACH {}",
        quote_identifier(&trig.name),
        timing_str(trig.timing),
        events,
        qualified_name(&trig.schema, &trig.table),
        level_str(trig.level)
    );
    if let Some(when) = &trig.when_clause {
        if !when.trim().is_empty() {
            s.push_str(&format!("\nWHEN ({})", when.trim()));
        }
    }
    s.push_str(&format!("\nEXECUTE FUNCTION {}()", func_target));
    Ok(s)
}

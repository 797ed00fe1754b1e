use std::io::{self, Write};

use schema::{Schema, Values};
use usm_engine::{Control, DraftSnapshot, Manager, OwnerSummary};

/// One line per owner: shortened name, id, version.
pub fn owners(out: &mut impl Write, owners: &[OwnerSummary]) -> io::Result<()> {
    if owners.is_empty() {
        return writeln!(out, "no matching owners");
    }
    let width = owners
        .iter()
        .map(|o| o.display_name.chars().count())
        .max()
        .unwrap_or(0);
    for o in owners {
        writeln!(
            out,
            "{:<width$}  {}  v{}",
            o.display_name,
            o.id,
            o.version,
            width = width
        )?;
    }
    Ok(())
}

/// Header, then one control per field with its violations.
pub fn draft(out: &mut impl Write, schema: &Schema, snap: &DraftSnapshot) -> io::Result<()> {
    writeln!(
        out,
        "{} v{}  [{}]",
        schema.name,
        schema.version,
        snap.status.label()
    )?;
    if let Some(description) = &schema.description {
        writeln!(out, "{}", description)?;
    }
    for field in &schema.settings {
        let control = Control::for_field(field);
        let value = snap.values.get(&field.key).cloned().unwrap_or_default();
        write!(
            out,
            "  {} ({}) <{}>: {}",
            field.label,
            field.key,
            control.name(),
            control.render(&value)
        )?;
        if let Some(counter) = control.counter(&value) {
            write!(out, "  {}", counter)?;
        }
        writeln!(out)?;
        if let Some(description) = &field.description {
            writeln!(out, "      {}", description)?;
        }
        for message in snap.errors.get(&field.key).into_iter().flatten() {
            writeln!(out, "      ! {}", message)?;
        }
    }
    Ok(())
}

/// The active draft of `manager`, or a note that nothing is selected.
pub fn session(out: &mut impl Write, manager: &Manager) -> io::Result<()> {
    let Some(snap) = manager.snapshot() else {
        return writeln!(out, "no owner selected");
    };
    let Some(schema) = manager.schema(&snap.owner) else {
        return writeln!(out, "owner {} is no longer registered", snap.owner);
    };
    draft(out, &schema, &snap)
}

/// Values as pretty JSON.
pub fn values(values: &Values) -> serde_json::Result<String> {
    serde_json::to_string_pretty(values)
}

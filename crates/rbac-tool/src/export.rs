//! CSV export of the account view.

use rbac_model::AccountRecord;
use std::io;
use std::path::{Path, PathBuf};

use crate::render::rule_rows;

/// Default output file for the account list.
pub const USER_LIST_FILE: &str = "userList.csv";
/// Default output file for the account list with rules.
pub const USER_LIST_EXTENDED_FILE: &str = "userListExtended.csv";

/// The default file name for an export.
pub fn default_file_name(more: bool) -> PathBuf {
    PathBuf::from(if more { USER_LIST_EXTENDED_FILE } else { USER_LIST_FILE })
}

/// Write the account view as CSV and return the number of data records.
///
/// The columns follow the account table, except that the account type is
/// written in full. With `more`, the first rule of each binding shares its
/// record and further rules get records of their own with the binding
/// columns left empty; a binding without rules leaves the rule columns
/// empty.
pub fn write_accounts<W: io::Write>(writer: W, accounts: &[AccountRecord], more: bool) -> csv::Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut header = vec!["Account Name", "Account Type", "Kind", "Namespace", "RoleRefName", "RoleRefKind"];
    if more {
        header.extend(["apiGroups", "Resources", "Verbs"]);
    }
    csv.write_record(&header)?;

    let mut records = 0;
    for account in accounts {
        for binding in &account.bindings {
            let grant = [
                account.name.as_str(),
                account.principal_kind.as_str(),
                binding.kind.as_str(),
                binding.namespace.as_str(),
                binding.role_ref_name.as_str(),
                binding.role_ref_kind.as_str(),
            ];

            if !more {
                csv.write_record(grant)?;
                records += 1;
                continue;
            }

            let mut rules = binding.attached_rules.iter().flat_map(rule_rows);
            match rules.next() {
                Some(first) => {
                    csv.write_record(grant.iter().copied().chain(first.iter().map(String::as_str)))?;
                    records += 1;
                    for rest in rules {
                        csv.write_record(
                            std::iter::repeat("").take(6).chain(rest.iter().map(String::as_str)),
                        )?;
                        records += 1;
                    }
                }
                None => {
                    csv.write_record(grant.iter().copied().chain(["", "", ""]))?;
                    records += 1;
                }
            }
        }
    }

    csv.flush()?;
    tracing::debug!(records, more, "Wrote account CSV");
    Ok(records)
}

/// Write the account view to a file, replacing it if present.
pub fn save_accounts(path: &Path, accounts: &[AccountRecord], more: bool) -> csv::Result<usize> {
    let file = std::fs::File::create(path)?;
    write_accounts(io::BufWriter::new(file), accounts, more)
}

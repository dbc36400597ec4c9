use std::collections::HashSet;

use crate::iface::MethodSpec;

/// Interface methods whose name is not in `existing`, in interface order.
pub fn missing_methods<'m>(iface: &'m [MethodSpec], existing: &[String]) -> Vec<&'m MethodSpec> {
    let have: HashSet<&str> = existing.iter().map(String::as_str).collect();
    iface
        .iter()
        .filter(|m| !have.contains(m.name.as_str()))
        .collect()
}

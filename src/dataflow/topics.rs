//! Wire-level topic names. Other nodes address this node's pins by these
//! strings, so their format is part of the network contract.

/// Value topic of pin `id`: `pin/<id>`.
pub fn pin(id: u32) -> String {
    format!("pin/{id}")
}

/// Retarget channel of input `id`: `pin/<id>/src`.
pub fn pin_source(id: u32) -> String {
    format!("pin/{id}/src")
}

/// Write channel of parameter `id`: `param/<id>`.
pub fn param(id: u32) -> String {
    format!("param/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats() {
        assert_eq!(pin(10), "pin/10");
        assert_eq!(pin_source(10), "pin/10/src");
        assert_eq!(param(3), "param/3");
    }
}

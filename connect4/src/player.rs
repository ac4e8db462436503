use serde::{Deserialize, Serialize};

/// Seat of a player in a match. Also the token stored in occupied cells.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    First,
    Second,
}

impl Order {
    pub(crate) fn idx(self) -> usize {
        match self {
            Order::First => 0,
            Order::Second => 1,
        }
    }

    pub fn other(self) -> Order {
        match self {
            Order::First => Order::Second,
            Order::Second => Order::First,
        }
    }

    /// 1 for the first player, 2 for the second.
    pub fn number(self) -> u8 {
        self.idx() as u8 + 1
    }

    pub fn default_color(self) -> &'static str {
        match self {
            Order::First => "red",
            Order::Second => "blue",
        }
    }
}

/// User-supplied fields for one player; blanks fall back to per-order defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl PlayerConfig {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            color: Some(color.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    order: Order,
    pub name: String,
    pub color: String,
}

impl Player {
    pub fn new(order: Order, config: &PlayerConfig) -> Self {
        let name = non_blank(config.name.as_deref()).unwrap_or_else(|| order.number().to_string());
        let color = non_blank(config.color.as_deref())
            .unwrap_or_else(|| order.default_color().to_string());
        Self { order, name, color }
    }

    pub fn order(&self) -> Order {
        self.order
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

//! Static navigation scene standing in for the simulator: the agent starts
//! at rest with heading 0 and the obstacles never move.

use control::ObservationBuilder;

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub start: [f64; 2],
    pub obstacles: Vec<[f64; 2]>,
}

impl Scene {
    /// The observation vector the simulator would report for this scene.
    pub fn observation(&self) -> Vec<f64> {
        self.obstacles
            .iter()
            .fold(
                ObservationBuilder::new().position(self.start[0], self.start[1]),
                |builder, &[x, y]| builder.obstacle(x, y),
            )
            .build()
    }
}

/// Parses `"x,y"` into a point.
pub fn parse_point(s: &str) -> Result<[f64; 2], String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate `{v}`: {e}"))
    };
    Ok([parse(x)?, parse(y)?])
}

//! Drive speed limiting
//!
//! While the manipulator is raised (or the operator asks for it) the drivetrain is slowed down to
//! keep the robot stable.

use super::params::TurtleParams;
use super::triggers::{Trigger, TriggerCtx};

/// Scale to apply to the operator's drive demands this cycle.
pub fn drive_scale(ctx: &TriggerCtx, params: &TurtleParams) -> f64 {
    if Trigger::Turtle.eval(ctx) {
        params.reduced_scale
    } else {
        1.0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::supersys::test_params;
    use comms_if::{eqpt::mech::{ActId, MechSensData}, tc::supersys::PresetId};

    #[test]
    fn test_drive_scale() {
        let params = test_params();
        let table = params.validate().unwrap();
        let l3_m = table.get(PresetId::ScoreL3).height_m;

        let mut sens = MechSensData::default();
        let ctx = TriggerCtx::new(&sens, false, false, &params, &table);
        assert_eq!(drive_scale(&ctx, &params.turtle), 1.0);

        let ctx = TriggerCtx::new(&sens, false, true, &params, &table);
        assert_eq!(drive_scale(&ctx, &params.turtle), 0.357);

        sens.pos.insert(ActId::Elevator, l3_m);
        let ctx = TriggerCtx::new(&sens, false, false, &params, &table);
        assert_eq!(drive_scale(&ctx, &params.turtle), 0.357);
    }
}

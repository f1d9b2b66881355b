//! Property tests for the input surfaces.

use fruitbox_game::prelude::*;
use proptest::prelude::*;

proptest! {
    /// The pointer clamp holds for any input x, however far outside the box.
    #[test]
    fn pointer_clamp_stays_in_bounds(x in -1.0e6f64..1.0e6) {
        let mut game =
            GameCore::new(PlayfieldConfig::classic(), Box::new(ScriptedRanks::new(&[0])));
        game.init();
        game.press_start();

        let clamped = game.pointer_move(x);
        let config = PlayfieldConfig::classic();
        prop_assert!(clamped >= config.left_limit(Rank::new(0)));
        prop_assert!(clamped <= config.right_limit(Rank::new(0)));
    }

    /// Every seed produces only player-spawnable ranks.
    #[test]
    fn sampled_ranks_stay_spawnable(seed in any::<u64>()) {
        let mut source = PcgRankSource::new(seed);
        for _ in 0..32 {
            prop_assert!(source.next_rank().get() < POP_MAX_RANK);
        }
    }

    /// Dropping at an arbitrary pointer position never wedges the held fruit
    /// inside a wall.
    #[test]
    fn promoted_fruit_position_is_legal(x in -1.0e4f64..1.0e4) {
        let mut game =
            GameCore::new(PlayfieldConfig::classic(), Box::new(ScriptedRanks::new(&[0, 0, 0])));
        game.init();
        game.press_start();
        game.pointer_move(x);
        game.request_drop();

        let held = game.held().expect("held fruit after drop");
        if let Some(BodyTag::Fruit(rank)) = game.tag(held) {
            let config = PlayfieldConfig::classic();
            let fruits = game.fruits();
            let (_, _, (hx, _)) = fruits
                .iter()
                .find(|(id, _, _)| *id == held)
                .expect("held fruit position");
            prop_assert!(*hx >= config.left_limit(rank));
            prop_assert!(*hx <= config.right_limit(rank));
        }
    }
}

use crate::foundation::core::Shift;
use crate::task::BlockColor;

/// Number of phrasing variants; a template is picked by index in `0..TEMPLATE_COUNT`.
pub const TEMPLATE_COUNT: usize = 3;

/// Values substituted into a phrasing template.
#[derive(Clone, Copy, Debug)]
pub struct PromptFields {
    pub grid_size: u32,
    pub num_blocks: usize,
    pub color: BlockColor,
    pub shift: Shift,
}

impl PromptFields {
    fn step_word(&self) -> &'static str {
        if self.shift.magnitude() == 1 {
            "step"
        } else {
            "steps"
        }
    }

    fn cell_word(&self) -> &'static str {
        if self.shift.magnitude() == 1 {
            "cell"
        } else {
            "cells"
        }
    }
}

/// Fill template `index` (taken modulo [`TEMPLATE_COUNT`]).
pub fn render_prompt(index: usize, f: &PromptFields) -> String {
    let n = f.grid_size;
    let blocks = f.num_blocks;
    let color = f.color.name();
    let direction = f.shift.direction().adverb();
    let side = f.shift.direction().side_name();
    let steps = f.shift.magnitude();
    let step_word = f.step_word();
    let cell_word = f.cell_word();

    match index % TEMPLATE_COUNT {
        0 => format!(
            "The scene shows a {n}x{n} grid with {blocks} {color} square blocks, each with a \
             black outline, positioned at various locations. All blocks must move \
             simultaneously {direction} by exactly {steps} {step_word}. Each block shifts one \
             grid cell per step toward the {side}, and all blocks must remain within the grid \
             boundaries throughout the movement. After the movement, all blocks should be \
             positioned exactly {steps} {step_word} {direction} from their original positions."
        ),
        1 => format!(
            "The scene displays a {n}x{n} grid containing {blocks} {color} square blocks with \
             black borders, distributed across different cells. Move every block {direction} \
             by precisely {steps} {step_word}. All blocks move together at the same time, \
             shifting {steps} grid {cell_word} in the {side} direction, and each block must \
             stay within the grid's boundaries. The final configuration shows all blocks in \
             their new positions, each exactly {steps} {step_word} {direction} from where it \
             started."
        ),
        _ => format!(
            "In the scene, there is a {n}x{n} grid with {blocks} {color} square blocks, each \
             outlined in black, placed at different positions. Translate all blocks {direction} \
             by exactly {steps} {step_word}, moving simultaneously and uniformly. Each block \
             shifts {steps} {cell_word} toward the {side} direction, and all blocks must remain \
             completely within the grid boundaries. The goal is to achieve a configuration \
             where every block has been moved exactly {steps} {step_word} {direction} to reach \
             its final position."
        ),
    }
}

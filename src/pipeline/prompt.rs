/// Builds the instruction sent to the model for a single animation request.
pub fn build_prompt(description: &str) -> String {
    format!(
        r#"Create an elegant Manim animation for this description: "{description}"

Requirements:
1. Use these shapes and elements:
   - Basic shapes (Circle, Square, Rectangle, Line)
   - Transformations (FadeIn, FadeOut, Transform)
   - Smooth movements (MoveToTarget, Rotate)
2. Create visually appealing compositions
3. Keep the animation up to 10 seconds
4. Use proper spacing and positioning
5. Create objects one at a time with smooth transitions
6. Define exactly one class that inherits from Scene, declared as `class <Name>(Scene):`

Example code structure:
from manim import *

class ElegantScene(Scene):
    def construct(self):
        # Create main elements
        circle = Circle(radius=0.5, color=BLUE)
        self.play(FadeIn(circle))

        # Add complementary elements
        square = Square(side_length=1, color=RED)
        square.next_to(circle, RIGHT, buff=0.5)
        self.play(FadeIn(square))

        # Create smooth movement
        self.play(
            circle.animate.move_to([-2, 0, 0]),
            square.animate.move_to([2, 0, 0]),
            run_time=2
        )

        # Add final touch
        self.play(
            Rotate(circle, angle=PI),
            Rotate(square, angle=-PI),
            run_time=1.5
        )
        self.wait(1)

Return ONLY the Python code, no explanations."#
    )
}

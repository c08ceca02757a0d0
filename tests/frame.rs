mod tests {
    use led_fanout::frame::quantize_channel;
    use led_fanout::{FrameBuffer, Rgb, quantize};

    #[test]
    fn test_quantize_clamps() {
        assert_eq!(quantize_channel(-12.5), 0);
        assert_eq!(quantize_channel(255.0), 255);
        assert_eq!(quantize_channel(300.0), 255);
        assert_eq!(quantize_channel(f32::INFINITY), 255);
        assert_eq!(quantize_channel(f32::NEG_INFINITY), 0);
        assert_eq!(quantize_channel(f32::NAN), 0);
    }

    #[test]
    fn test_quantize_truncates() {
        assert_eq!(quantize_channel(0.99), 0);
        assert_eq!(quantize_channel(127.5), 127);
        assert_eq!(quantize_channel(254.999), 254);
    }

    #[test]
    fn test_quantize_frame() {
        let raw = [[300.0, -1.0, 42.7], [0.0, 128.2, f32::NAN]];
        let mut out = [Rgb::default(); 2];
        quantize(&raw, &mut out);
        assert_eq!(out, [Rgb::new(255, 0, 42), Rgb::new(0, 128, 0)]);
    }

    #[test]
    fn test_new_buffer_was_never_sent() {
        let frame = FrameBuffer::new(4);
        assert_eq!(frame.len(), 4);
        assert!(!frame.is_empty());
        assert!(frame.previous().iter().all(Option::is_none));
        assert!(frame.current().iter().all(|pixel| *pixel == [0.0; 3]));
    }

    #[test]
    fn test_set_and_fill() {
        let mut frame = FrameBuffer::new(3);
        frame.fill([1.0, 2.0, 3.0]);
        frame.set(1, [255.0, 0.0, 0.0]);
        // Out of range writes are dropped
        frame.set(3, [9.0, 9.0, 9.0]);
        frame.current_mut()[2][2] = 77.0;

        let mut out = [Rgb::default(); 3];
        frame.quantize_into(&mut out);
        assert_eq!(
            out,
            [Rgb::new(1, 2, 3), Rgb::new(255, 0, 0), Rgb::new(1, 2, 77)]
        );
    }
}
